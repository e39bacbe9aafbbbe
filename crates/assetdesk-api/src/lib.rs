// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Blocking client for the asset REST service.

pub mod wire;

use anyhow::{Context, Result, bail};
use assetdesk_app::{
    AssetField, AssetNumber, AssetPage, AssetQuery, AssetRecord, AssetStore, AssetUpdate,
    Authenticator, Session, StoreError, Username, require_credentials,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::wire::{
    ErrorEnvelope, ItemEnvelope, ListEnvelope, LoginEnvelope, record_from_wire, record_to_wire,
    update_to_wire,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const FALLBACK_ERROR: &str = "API request failed";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
    token: Option<String>,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("remote.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("remote.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "remote.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("remote.base_url {trimmed:?} cannot carry a path");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|token| !token.is_empty());
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        require_credentials(username, password)?;
        let url = self.endpoint(&["auth", "login"], &[]);
        let request = self
            .http
            .post(url)
            .json(&json!({ "username": username.trim(), "password": password }));
        let response = self.send(request, None)?;
        let status = response.status();
        let envelope: LoginEnvelope = decode(response)?;
        let message = envelope.message.clone();
        let Some(token) = envelope.into_token() else {
            return Err(StoreError::Server {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| "login response carried no token".to_owned()),
            });
        };

        debug!(username = username.trim(), "signed in to asset service");
        self.token = Some(token.clone());
        Ok(Session {
            username: Username::new(username.trim()),
            token: Some(token),
        })
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    pub fn list_assets(&mut self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        let page = query.window.page().to_string();
        let size = query.window.size().to_string();
        let mut pairs = query.filter.pairs();
        pairs.push(("page", page.as_str()));
        pairs.push(("pageSize", size.as_str()));

        let url = self.endpoint(&["assets"], &pairs);
        let request = self.http.get(url);
        let response = self.send(request, None)?;
        let status = response.status();
        let envelope: ListEnvelope = decode(response)?;
        reject_unsuccessful(status, envelope.success, envelope.message.as_deref())?;

        let records = envelope
            .data
            .iter()
            .map(|asset| record_from_wire(asset).map_err(|detail| malformed(status, &detail)))
            .collect::<Result<Vec<_>, _>>()?;

        // Without a total the service returned the whole collection unpaged.
        match envelope.total {
            Some(total) => Ok(AssetPage {
                rows: records,
                total,
            }),
            None => Ok(query.apply(&records)),
        }
    }

    pub fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        let url = self.endpoint(&["assets", asset_number.as_str()], &[]);
        let request = self.http.get(url);
        let response = self.send(request, Some(asset_number))?;
        self.decode_item(response)?
            .ok_or_else(|| StoreError::NotFound(asset_number.clone()))
    }

    pub fn create_asset(&mut self, asset: &AssetRecord) -> Result<AssetRecord, StoreError> {
        let url = self.endpoint(&["assets"], &[]);
        let request = self.http.post(url).json(&record_to_wire(asset));
        let response = self.send(request, None)?;
        let created = self.decode_item(response)?;
        Ok(created.unwrap_or_else(|| asset.clone()))
    }

    pub fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError> {
        let body = update_to_wire(update)?;
        let url = self.endpoint(&["assets", asset_number.as_str()], &[]);
        let request = self.http.put(url).json(&body);
        let response = self.send(request, Some(asset_number))?;
        match self.decode_item(response)? {
            Some(record) => Ok(record),
            None => self.get_asset(asset_number),
        }
    }

    pub fn update_field(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> Result<(), StoreError> {
        let body = update_to_wire(&AssetUpdate::single(field, value))?;
        let url = self.endpoint(&["assets", asset_number.as_str()], &[]);
        let request = self.http.patch(url).json(&body);
        let response = self.send(request, Some(asset_number))?;
        let status = response.status();
        let body = response.text().unwrap_or_default();
        if let Ok(envelope) = serde_json::from_str::<ItemEnvelope>(&body) {
            reject_unsuccessful(status, envelope.success, envelope.message.as_deref())?;
        }
        Ok(())
    }

    pub fn delete_asset(&mut self, asset_number: &AssetNumber) -> Result<(), StoreError> {
        let url = self.endpoint(&["assets", asset_number.as_str()], &[]);
        let request = self.http.delete(url);
        self.send(request, Some(asset_number))?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str], pairs: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    fn send(
        &mut self,
        request: RequestBuilder,
        asset_number: Option<&AssetNumber>,
    ) -> Result<Response, StoreError> {
        let request = match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, &error))?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "asset service responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let error = clean_error_response(status, &body, asset_number);
        if matches!(error, StoreError::Unauthorized(_)) && self.token.take().is_some() {
            warn!(status = status.as_u16(), "discarding rejected session token");
        }
        Err(error)
    }

    fn decode_item(&self, response: Response) -> Result<Option<AssetRecord>, StoreError> {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        if body.trim().is_empty() {
            return Ok(None);
        }
        let envelope: ItemEnvelope =
            serde_json::from_str(&body).map_err(|error| malformed(status, &error.to_string()))?;
        reject_unsuccessful(status, envelope.success, envelope.message.as_deref())?;
        envelope
            .data
            .map(|asset| record_from_wire(&asset).map_err(|detail| malformed(status, &detail)))
            .transpose()
    }
}

impl AssetStore for Client {
    fn list_assets(&mut self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        Client::list_assets(self, query)
    }

    fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        Client::get_asset(self, asset_number)
    }

    fn create_asset(&mut self, asset: &AssetRecord) -> Result<AssetRecord, StoreError> {
        Client::create_asset(self, asset)
    }

    fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError> {
        Client::update_asset(self, asset_number, update)
    }

    fn update_field(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> Result<(), StoreError> {
        Client::update_field(self, asset_number, field, value)
    }

    fn delete_asset(&mut self, asset_number: &AssetNumber) -> Result<(), StoreError> {
        Client::delete_asset(self, asset_number)
    }
}

impl Authenticator for Client {
    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        Client::login(self, username, password)
    }

    fn logout(&mut self) {
        Client::logout(self);
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    serde_json::from_str(&body).map_err(|error| malformed(status, &error.to_string()))
}

fn reject_unsuccessful(
    status: StatusCode,
    success: Option<bool>,
    message: Option<&str>,
) -> Result<(), StoreError> {
    if success == Some(false) {
        return Err(StoreError::Server {
            status: status.as_u16(),
            message: message
                .filter(|message| !message.is_empty())
                .unwrap_or(FALLBACK_ERROR)
                .to_owned(),
        });
    }
    Ok(())
}

fn malformed(status: StatusCode, detail: &str) -> StoreError {
    StoreError::Server {
        status: status.as_u16(),
        message: format!("malformed response: {detail}"),
    }
}

fn connection_error(base_url: &Url, error: &reqwest::Error) -> StoreError {
    let cause = if error.is_timeout() {
        "request timed out".to_owned()
    } else {
        error.to_string()
    };
    StoreError::Network(format!(
        "{base_url} -- check [remote].base_url and that the service is running ({cause})"
    ))
}

fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return message;
    }
    if let Ok(Value::String(message)) = serde_json::from_str::<Value>(body)
        && !message.is_empty()
    {
        return message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return trimmed.to_owned();
    }
    FALLBACK_ERROR.to_owned()
}

fn clean_error_response(
    status: StatusCode,
    body: &str,
    asset_number: Option<&AssetNumber>,
) -> StoreError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        StatusCode::NOT_FOUND => match asset_number {
            Some(asset_number) => StoreError::NotFound(asset_number.clone()),
            None => StoreError::Server {
                status: status.as_u16(),
                message,
            },
        },
        StatusCode::CONFLICT => StoreError::Duplicate(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            StoreError::Validation(message)
        }
        _ => StoreError::Server {
            status: status.as_u16(),
            message,
        },
    }
}
