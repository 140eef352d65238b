// Persistence ports consumed by the session.
//
// The session owns the contracts; concrete implementations live in
// `pitlight-config` (keyring + profile file) and, for tests and embedding,
// the in-memory stores below.

use std::collections::BTreeSet;
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Failure reading or writing a persistence backend.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Persists the opaque API credential.
///
/// A credential is either present or absent -- no partial states.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<SecretString>, StoreError>;
    fn set(&self, token: &SecretString) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Persists the set of selected light ids.
pub trait SelectionStore: Send + Sync {
    fn get(&self) -> Result<BTreeSet<String>, StoreError>;
    fn set(&self, selection: &BTreeSet<String>) -> Result<(), StoreError>;
}

// ── In-memory implementations ───────────────────────────────────────

/// In-memory credential store for tests and embedded use.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<SecretString>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<SecretString>, StoreError> {
        Ok(self
            .token
            .lock()
            .map_err(|e| StoreError(e.to_string()))?
            .clone())
    }

    fn set(&self, token: &SecretString) -> Result<(), StoreError> {
        *self.token.lock().map_err(|e| StoreError(e.to_string()))? =
            Some(SecretString::from(token.expose_secret().to_owned()));
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.token.lock().map_err(|e| StoreError(e.to_string()))? = None;
        Ok(())
    }
}

/// In-memory selection store for tests and embedded use.
#[derive(Default)]
pub struct MemorySelectionStore {
    selection: Mutex<BTreeSet<String>>,
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self
            .selection
            .lock()
            .map_err(|e| StoreError(e.to_string()))?
            .clone())
    }

    fn set(&self, selection: &BTreeSet<String>) -> Result<(), StoreError> {
        *self
            .selection
            .lock()
            .map_err(|e| StoreError(e.to_string()))? = selection.clone();
        Ok(())
    }
}
