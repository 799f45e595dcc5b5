//! Core traits and types for secret storage

use thiserror::Error;

use crate::providers::ApiKey;

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Source of provider credentials
///
/// Keys are either provider ids (e.g., "openai", mapped by the env store to
/// `OPENAI_API_KEY`) or names chosen in an `AdapterProfile`.
///
/// # Example
///
/// ```
/// use llmgate_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.store("openai", "sk-test").unwrap();
/// assert_eq!(store.get("openai").unwrap().expose(), "sk-test");
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a credential by key
    fn get(&self, key: &str) -> Option<ApiKey>;

    /// Store a credential
    ///
    /// Returns `Err(SecretStoreError::ReadOnly)` if the store doesn't support writing.
    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    /// Delete a credential
    fn delete(&self, key: &str) -> SecretStoreResult<()>;

    /// Check if a credential exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
