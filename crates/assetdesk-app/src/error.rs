// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::AssetNumber;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("cannot reach asset service: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("asset {0} not found")]
    NotFound(AssetNumber),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("session expired or not authorized: {0}")]
    Unauthorized(String),

    #[error("local storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(context: &str, error: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{context}: {error}"))
    }

    pub const fn title(&self) -> &'static str {
        match self {
            Self::Network(_) => "Network Failure",
            Self::Server { .. } => "Server Error",
            Self::Validation(_) => "Validation Error",
            Self::NotFound(_) => "Not Found",
            Self::Duplicate(_) => "Duplicate Asset",
            Self::Unauthorized(_) => "Signed Out",
            Self::Storage(_) => "Storage Error",
        }
    }
}
