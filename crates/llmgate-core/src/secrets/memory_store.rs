//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::providers::ApiKey;
use super::traits::{SecretStore, SecretStoreResult};

/// In-memory secret store for testing and ephemeral use
///
/// Secrets are lost when the store is dropped.
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, ApiKey>>,
}

impl MemorySecretStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when seeding a store in one expression
    pub fn with_secret(self, key: impl Into<String>, value: impl Into<ApiKey>) -> Self {
        self.secrets.write().insert(key.into(), value.into());
        self
    }

    pub fn clear(&self) {
        self.secrets.write().clear();
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySecretStore")
            .field("keys", &self.secrets.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<ApiKey> {
        self.secrets.read().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.secrets.write().insert(key.to_string(), ApiKey::new(value));
        Ok(())
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        self.secrets.write().remove(key);
        Ok(())
    }
}
