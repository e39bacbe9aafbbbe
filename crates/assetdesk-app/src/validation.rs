// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::macros::format_description;

use crate::StoreError;

pub const DATE_LAYOUT: &str = "YYYY-MM-DD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    InvalidDate,
    InvalidYear,
    InvalidFlag,
    InvalidStatus,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate => write!(f, "invalid date value; use {DATE_LAYOUT}"),
            Self::InvalidYear => f.write_str("invalid year value; use a four-digit year"),
            Self::InvalidFlag => f.write_str("invalid yes/no value"),
            Self::InvalidStatus => {
                f.write_str("invalid status; use Active, In Repair, Transferred or Retired")
            }
        }
    }
}

impl std::error::Error for FieldError {}

impl From<FieldError> for StoreError {
    fn from(error: FieldError) -> Self {
        StoreError::Validation(error.to_string())
    }
}

pub type FieldResult<T> = std::result::Result<T, FieldError>;

pub fn parse_optional_date(input: &str) -> FieldResult<Option<Date>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    Date::parse(date_part, &format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| FieldError::InvalidDate)
}

pub fn format_date(value: Option<Date>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    format!(
        "{:04}-{:02}-{:02}",
        value.year(),
        u8::from(value.month()),
        value.day()
    )
}

pub fn parse_optional_year(input: &str) -> FieldResult<Option<i32>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let year = trimmed
        .parse::<i32>()
        .map_err(|_| FieldError::InvalidYear)?;
    if !(1900..=9999).contains(&year) {
        return Err(FieldError::InvalidYear);
    }
    Ok(Some(year))
}

pub fn format_year(value: Option<i32>) -> String {
    value.map_or_else(String::new, |year| year.to_string())
}

pub fn parse_flag(input: &str) -> FieldResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "no" | "n" | "false" | "0" => Ok(false),
        "yes" | "y" | "true" | "1" => Ok(true),
        _ => Err(FieldError::InvalidFlag),
    }
}

pub const fn format_flag(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

pub fn optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
