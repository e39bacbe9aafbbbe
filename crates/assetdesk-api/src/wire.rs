// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! JSON shape of assets as the REST API sends and accepts them.

use assetdesk_app::validation::format_flag;
use assetdesk_app::{AssetField, AssetRecord, AssetUpdate, FieldKind, StoreError};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const ASSET_NUMBER_KEY: &str = "assetNo";

pub type WireAsset = Map<String, Value>;

#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<WireAsset>,
    #[serde(default)]
    pub total: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<WireAsset>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginEnvelope {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<LoginData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
}

impl LoginEnvelope {
    pub fn into_token(self) -> Option<String> {
        self.token
            .or_else(|| self.data.and_then(|data| data.token))
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Decodes one asset. Unknown keys are ignored and missing ones leave the
/// attribute empty; the asset number is required.
pub fn record_from_wire(asset: &WireAsset) -> Result<AssetRecord, String> {
    let asset_number = asset
        .get(ASSET_NUMBER_KEY)
        .map(value_text)
        .filter(|number| !number.trim().is_empty())
        .ok_or_else(|| format!("asset is missing `{ASSET_NUMBER_KEY}`"))?;

    let mut record = AssetRecord::new(asset_number.trim());
    for field in AssetField::ALL {
        let Some(value) = asset.get(field.wire_name()) else {
            continue;
        };
        let text = value_text(value);
        if field == AssetField::Status && text.is_empty() {
            continue;
        }
        field
            .apply(&mut record, &text)
            .map_err(|error| format!("{}: {error}", field.wire_name()))?;
    }
    Ok(record)
}

pub fn record_to_wire(record: &AssetRecord) -> WireAsset {
    let mut asset = Map::new();
    asset.insert(
        ASSET_NUMBER_KEY.to_owned(),
        Value::String(record.asset_number.to_string()),
    );
    for field in AssetField::ALL {
        asset.insert(field.wire_name().to_owned(), field_value(record, field));
    }
    asset
}

/// Encodes only the fields named in `update`, validating each value.
pub fn update_to_wire(update: &AssetUpdate) -> Result<WireAsset, StoreError> {
    let mut scratch = AssetRecord::new("");
    let mut asset = Map::new();
    for (field, value) in update.iter() {
        field.apply(&mut scratch, value)?;
        asset.insert(field.wire_name().to_owned(), field_value(&scratch, field));
    }
    Ok(asset)
}

pub fn field_value(record: &AssetRecord, field: AssetField) -> Value {
    match field.kind() {
        FieldKind::Status => Value::String(record.status.code().to_owned()),
        FieldKind::Flag => Value::String(format_flag(record.warranty).to_owned()),
        FieldKind::Year => record.purchased_year.map_or(Value::Null, Value::from),
        FieldKind::Date => {
            let text = field.value_of(record);
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            }
        }
        FieldKind::Text => match field.value_of(record) {
            text if text.is_empty() => Value::Null,
            text => Value::String(text),
        },
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => format_flag(*flag).to_owned(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}
