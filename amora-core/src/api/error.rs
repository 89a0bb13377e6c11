// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the messenger API layer.

use thiserror::Error;

use crate::storage::StorageError;
use crate::wire::WireError;

/// Unified error type for messenger operations.
#[derive(Error, Debug)]
pub enum MessengerError {
    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend JSON could not be used.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Caller passed something unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The outbox cannot take another message.
    #[error("outbox full ({0} entries)")]
    OutboxFull(usize),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type for messenger operations.
pub type MessengerResult<T> = Result<T, MessengerError>;
