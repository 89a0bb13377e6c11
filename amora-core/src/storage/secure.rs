// SPDX-FileCopyrightText: 2026 Amora Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Secure Storage Module
//!
//! Storage for session tokens. Tokens never go into the SQLite cache; they
//! live in the OS keychain when available, or in whatever store the host
//! platform injects (iOS Keychain, Android KeyStore) through the trait.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage::StorageError;

/// Keychain entry for the backend access token.
pub const ACCESS_TOKEN: &str = "access_token";

/// Keychain entry for the backend refresh token.
pub const REFRESH_TOKEN: &str = "refresh_token";

/// Trait for secure storage of session tokens.
///
/// Implementations should use platform-native secure storage when available:
/// - macOS: Keychain
/// - Linux: Secret Service (GNOME Keyring, KDE Wallet)
/// - Windows: Credential Manager
pub trait SecureStorage: Send + Sync {
    /// Saves a token, replacing any previous value.
    fn save_token(&self, name: &str, token: &str) -> Result<(), StorageError>;

    /// Loads a token.
    /// Returns None if the token doesn't exist.
    fn load_token(&self, name: &str) -> Result<Option<String>, StorageError>;

    /// Deletes a token. Deleting a missing token is not an error.
    fn delete_token(&self, name: &str) -> Result<(), StorageError>;

    /// Checks if a token exists.
    fn has_token(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.load_token(name)?.is_some())
    }

    /// Removes both session tokens (logout).
    fn clear_session(&self) -> Result<(), StorageError> {
        self.delete_token(ACCESS_TOKEN)?;
        self.delete_token(REFRESH_TOKEN)
    }
}

/// Platform keyring implementation using the `keyring` crate.
/// Available when the `secure-storage` feature is enabled.
#[cfg(feature = "secure-storage")]
pub struct PlatformKeyring {
    service: String,
}

#[cfg(feature = "secure-storage")]
impl PlatformKeyring {
    /// Creates a new platform keyring accessor.
    ///
    /// # Arguments
    /// * `service` - The service name to use for keychain entries (e.g., "amora")
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, name: &str) -> Result<keyring::Entry, StorageError> {
        keyring::Entry::new(&self.service, name)
            .map_err(|e| StorageError::SecureStorage(format!("Keyring error: {}", e)))
    }
}

#[cfg(feature = "secure-storage")]
impl SecureStorage for PlatformKeyring {
    fn save_token(&self, name: &str, token: &str) -> Result<(), StorageError> {
        self.entry(name)?.set_password(token).map_err(|e| {
            StorageError::SecureStorage(format!("Failed to save to keychain: {}", e))
        })
    }

    fn load_token(&self, name: &str) -> Result<Option<String>, StorageError> {
        match self.entry(name)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::SecureStorage(format!(
                "Failed to load from keychain: {}",
                e
            ))),
        }
    }

    fn delete_token(&self, name: &str) -> Result<(), StorageError> {
        match self.entry(name)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(StorageError::SecureStorage(format!(
                "Failed to delete from keychain: {}",
                e
            ))),
        }
    }
}

/// Process-local token store.
///
/// Used in tests and on platforms where the host keeps the real secret and
/// hands it to the library at startup.
#[derive(Default)]
pub struct MemorySecureStorage {
    tokens: Mutex<HashMap<String, String>>,
}

impl MemorySecureStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tokens<R>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> R,
    ) -> Result<R, StorageError> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| StorageError::SecureStorage("token store lock poisoned".into()))?;
        Ok(f(&mut tokens))
    }
}

impl SecureStorage for MemorySecureStorage {
    fn save_token(&self, name: &str, token: &str) -> Result<(), StorageError> {
        self.with_tokens(|tokens| {
            tokens.insert(name.to_string(), token.to_string());
        })
    }

    fn load_token(&self, name: &str) -> Result<Option<String>, StorageError> {
        self.with_tokens(|tokens| tokens.get(name).cloned())
    }

    fn delete_token(&self, name: &str) -> Result<(), StorageError> {
        self.with_tokens(|tokens| {
            tokens.remove(name);
        })
    }
}
