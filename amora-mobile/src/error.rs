// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mobile-friendly error types.

use amora_core::{MessengerError, StorageError, WireError};

/// Mobile-friendly error type.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MobileError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Outbox full ({0} entries)")]
    OutboxFull(u32),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Server rejected request: {0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<StorageError> for MobileError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => MobileError::NotFound(what),
            other => MobileError::StorageError(other.to_string()),
        }
    }
}

impl From<WireError> for MobileError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Rejected(reason) => MobileError::Rejected(reason),
            other => MobileError::SerializationError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for MobileError {
    fn from(err: serde_json::Error) -> Self {
        MobileError::SerializationError(err.to_string())
    }
}

impl From<MessengerError> for MobileError {
    fn from(err: MessengerError) -> Self {
        match err {
            MessengerError::Storage(e) => e.into(),
            MessengerError::Wire(e) => e.into(),
            MessengerError::InvalidInput(msg) => MobileError::InvalidInput(msg),
            MessengerError::OutboxFull(max) => {
                MobileError::OutboxFull(u32::try_from(max).unwrap_or(u32::MAX))
            }
            MessengerError::Configuration(msg) => MobileError::ConfigurationError(msg),
            MessengerError::NotFound(what) => MobileError::NotFound(what),
        }
    }
}
