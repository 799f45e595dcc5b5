//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use crate::providers::ApiKey;
use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Provider ids and the variables checked for them, in order
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("openai-compatible", vec!["OPENAI_COMPATIBLE_API_KEY"]);
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m
});

/// Read-only store backed by environment variables
///
/// Lookup order for a key:
/// 1. the key itself as a variable name (`OPENAI_API_KEY`)
/// 2. the variables mapped to a provider id (`gemini` → `GEMINI_API_KEY`, `GOOGLE_API_KEY`)
/// 3. `<KEY>_API_KEY`, upper-cased with `-` turned into `_`
///
/// Empty values count as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Variables checked for a provider id
    pub fn env_vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP
            .get(provider.to_lowercase().as_str())
            .map(|v| v.as_slice())
    }

    fn read(name: &str) -> Option<ApiKey> {
        env::var(name).ok().filter(|v| !v.is_empty()).map(ApiKey::from)
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<ApiKey> {
        if let Some(value) = Self::read(key) {
            return Some(value);
        }

        if let Some(vars) = Self::env_vars_for_provider(key) {
            if let Some(value) = vars.iter().find_map(|var| Self::read(var)) {
                return Some(value);
            }
        }

        Self::read(&format!("{}_API_KEY", key.to_uppercase().replace('-', "_")))
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }
}
