// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::model::{AssetField, AssetRecord, AssetStatus};
use crate::store::AssetUpdate;
use crate::validation::format_flag;
use crate::{AssetNumber, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Add,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    AssetNumber,
    Field(AssetField),
}

impl FormField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AssetNumber => "Asset Number",
            Self::Field(field) => field.label(),
        }
    }
}

pub const FORM_FIELDS: [AssetField; 23] = [
    AssetField::Name,
    AssetField::Category,
    AssetField::Brand,
    AssetField::Model,
    AssetField::SerialNumber,
    AssetField::IpAddress,
    AssetField::EmployeeNumber,
    AssetField::EmployeeName,
    AssetField::Designation,
    AssetField::Division,
    AssetField::Section,
    AssetField::Branch,
    AssetField::Floor,
    AssetField::Vendor,
    AssetField::Status,
    AssetField::StatusDate,
    AssetField::AddedDate,
    AssetField::TransferDate,
    AssetField::PurchasedYear,
    AssetField::Warranty,
    AssetField::WarrantyStart,
    AssetField::WarrantyEnd,
    AssetField::Remarks,
];

pub const REQUIRED_FIELDS: [AssetField; 10] = [
    AssetField::Name,
    AssetField::Category,
    AssetField::Brand,
    AssetField::Model,
    AssetField::SerialNumber,
    AssetField::Division,
    AssetField::Branch,
    AssetField::IpAddress,
    AssetField::EmployeeName,
    AssetField::EmployeeNumber,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetForm {
    kind: FormKind,
    asset_number: String,
    values: BTreeMap<AssetField, String>,
}

impl AssetForm {
    pub fn blank() -> Self {
        let mut values = BTreeMap::new();
        values.insert(AssetField::Status, AssetStatus::Active.label().to_owned());
        values.insert(AssetField::Warranty, format_flag(false).to_owned());
        Self {
            kind: FormKind::Add,
            asset_number: String::new(),
            values,
        }
    }

    pub fn from_record(record: &AssetRecord) -> Self {
        let values = FORM_FIELDS
            .into_iter()
            .map(|field| (field, field.value_of(record)))
            .collect();
        Self {
            kind: FormKind::Edit,
            asset_number: record.asset_number.to_string(),
            values,
        }
    }

    pub const fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn fields(&self) -> Vec<FormField> {
        std::iter::once(FormField::AssetNumber)
            .chain(FORM_FIELDS.into_iter().map(FormField::Field))
            .collect()
    }

    pub fn is_required(field: FormField) -> bool {
        match field {
            FormField::AssetNumber => true,
            FormField::Field(field) => REQUIRED_FIELDS.contains(&field),
        }
    }

    pub fn is_read_only(&self, field: FormField) -> bool {
        self.kind == FormKind::Edit && field == FormField::AssetNumber
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::AssetNumber => &self.asset_number,
            FormField::Field(field) => self.values.get(&field).map_or("", String::as_str),
        }
    }

    pub fn set_value(&mut self, field: FormField, value: &str) -> Result<(), StoreError> {
        if self.is_read_only(field) {
            return Err(StoreError::validation(
                "asset number cannot be changed after creation",
            ));
        }
        match field {
            FormField::AssetNumber => value.clone_into(&mut self.asset_number),
            FormField::Field(field) => {
                self.values.insert(field, value.to_owned());
            }
        }
        Ok(())
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|field| Self::is_required(*field) && self.value(*field).trim().is_empty())
            .map(FormField::label)
            .collect()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        self.to_record().map(|_| ())
    }

    pub fn to_record(&self) -> Result<AssetRecord, StoreError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "Please fill required fields: {}",
                missing.join(", ")
            )));
        }
        let mut record = AssetRecord::new(AssetNumber::new(self.asset_number.trim()));
        for (field, value) in &self.values {
            let value = field.normalize_choice(value)?;
            field.apply(&mut record, &value)?;
        }
        if record.department.is_none() {
            record.department.clone_from(&record.division);
        }
        Ok(record)
    }

    pub fn to_update(&self) -> Result<AssetUpdate, StoreError> {
        let record = self.to_record()?;
        let mut update = AssetUpdate::new();
        for field in FORM_FIELDS {
            update.set(field, field.value_of(&record));
        }
        Ok(update)
    }
}
