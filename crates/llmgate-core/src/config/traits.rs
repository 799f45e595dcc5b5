//! Configuration provider trait and profile type

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::providers::AdapterConfig;

/// A named, serializable recipe for one adapter instance
///
/// ```yaml
/// profiles:
///   - name: fast
///     provider: openai
///     model: gpt-4o-mini
///   - name: local
///     provider: openai-compatible
///     model: llama3
///     api_base: http://localhost:11434/v1
///     credential: local-llm
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterProfile {
    /// Profile name, unique (case-insensitive) within a provider of profiles
    pub name: String,
    /// Provider id as registered in the factory
    pub provider: String,
    /// Model identifier
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Per-call timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Secret-store key for the credential; defaults to the provider id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl AdapterProfile {
    pub fn new(name: impl Into<String>, provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            model: model.into(),
            api_base: None,
            timeout_secs: None,
            credential: None,
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_credential(mut self, key: impl Into<String>) -> Self {
        self.credential = Some(key.into());
        self
    }

    /// Key to look up in a `SecretStore`
    pub fn credential_key(&self) -> &str {
        self.credential.as_deref().unwrap_or(&self.provider)
    }

    /// Per-instance adapter config described by this profile
    pub fn adapter_config(&self) -> AdapterConfig {
        let mut config = AdapterConfig::new(&self.model);
        if let Some(base) = &self.api_base {
            config = config.with_api_base(base);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: YAML file
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Get all configured profiles
    async fn get_profiles(&self) -> ConfigResult<Vec<AdapterProfile>>;

    /// Get one profile by name (case-insensitive)
    async fn get_profile(&self, name: &str) -> ConfigResult<AdapterProfile> {
        self.get_profiles()
            .await?
            .into_iter()
            .find(|p| p.matches(name))
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Add a new profile
    async fn add_profile(&self, profile: AdapterProfile) -> ConfigResult<()>;

    /// Replace an existing profile
    async fn update_profile(&self, name: &str, profile: AdapterProfile) -> ConfigResult<()>;

    /// Remove a profile
    async fn remove_profile(&self, name: &str) -> ConfigResult<()>;
}

/// Errors raised before any network call happens
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider already registered: {0}")]
    ProviderExists(String),

    #[error("Provider {provider} requires setting `{setting}`")]
    MissingSetting { provider: String, setting: &'static str },

    #[error("No credential found for key: {0}")]
    MissingCredential(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile already exists: {0}")]
    ProfileExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
