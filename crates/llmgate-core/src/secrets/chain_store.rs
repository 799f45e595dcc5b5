//! Chained secret store with fallback behavior

use std::sync::Arc;

use crate::providers::ApiKey;
use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Tries each store in order for reads; writes go to the first store
///
/// # Example
///
/// ```
/// use llmgate_core::secrets::{SecretStore, ChainSecretStore, EnvSecretStore, MemorySecretStore};
/// use std::sync::Arc;
///
/// // Memory overrides first, then the environment
/// let chain = ChainSecretStore::new(vec![
///     Arc::new(MemorySecretStore::new()),
///     Arc::new(EnvSecretStore::new()),
/// ]);
/// chain.store("gemini", "test-key").unwrap();
/// assert!(chain.has("gemini"));
/// ```
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// The stores in this chain
    pub fn stores(&self) -> &[Arc<dyn SecretStore>] {
        &self.stores
    }

    /// Name of the first store holding `key`
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.stores.iter().find(|s| s.has(key)).map(|s| s.name())
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> Option<ApiKey> {
        self.stores.iter().find_map(|store| store.get(key))
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        match self.stores.first() {
            Some(store) => store.store(key, value),
            None => Err(SecretStoreError::Other("chain has no stores".to_string())),
        }
    }

    /// Deletes from every store that accepts it; read-only stores are skipped
    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        for store in self.stores.iter().filter(|s| s.has(key)) {
            match store.delete(key) {
                Ok(()) | Err(SecretStoreError::ReadOnly) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::{EnvSecretStore, MemorySecretStore};

    #[test]
    fn test_chain_fallback_order() {
        let first: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::new().with_secret("openai", "from-first"));
        let second: Arc<dyn SecretStore> = Arc::new(
            MemorySecretStore::new()
                .with_secret("openai", "from-second")
                .with_secret("anthropic", "only-second"),
        );
        let chain = ChainSecretStore::new(vec![first, second]);

        assert_eq!(chain.get("openai"), Some(ApiKey::new("from-first")));
        assert_eq!(chain.get("anthropic"), Some(ApiKey::new("only-second")));
        assert_eq!(chain.source_of("anthropic"), Some("memory"));
        assert_eq!(chain.get("gemini-missing-key"), None);
    }

    #[test]
    fn test_chain_writes_to_first_store() {
        let memory = Arc::new(MemorySecretStore::new());
        let env: Arc<dyn SecretStore> = Arc::new(EnvSecretStore::new());
        let chain = ChainSecretStore::new(vec![memory.clone() as Arc<dyn SecretStore>, env]);

        chain.store("custom", "value").unwrap();
        assert!(memory.has("custom"));

        chain.delete("custom").unwrap();
        assert!(!memory.has("custom"));
    }

    #[test]
    fn test_empty_chain() {
        let chain = ChainSecretStore::new(Vec::new());
        assert!(chain.get("openai").is_none());
        assert!(matches!(chain.store("k", "v"), Err(SecretStoreError::Other(_))));
    }
}
