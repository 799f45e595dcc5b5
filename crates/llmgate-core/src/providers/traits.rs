//! Adapter trait definition

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::logging::{default_logger, SharedLogger};
use crate::types::{Completion, FunctionDefinition, Message};
use super::error::GatewayResult;

/// Default timeout applied to every network call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider credential
///
/// Held in memory for the adapter's lifetime only. `Debug` never prints
/// the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Expose the raw value for the auth header or query parameter
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Per-instance adapter configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    /// Model identifier as used by the provider's API
    pub model: String,
    /// Custom API base URL (no trailing slash needed)
    pub api_base: Option<String>,
    /// Upper bound for each network call
    pub timeout: Duration,
}

impl AdapterConfig {
    /// Create a new adapter config
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_base: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured base URL, or the provider default, without trailing slash
    pub fn base_url(&self, default: &str) -> String {
        self.api_base
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Options for a single completion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Provider-specific fields merged into the top level of the request body
    pub extra: Option<Map<String, Value>>,
}

impl CompletionOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Add one provider-specific request field
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }
}

/// How a provider supports structured function invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCalling {
    /// The wire protocol carries function declarations and calls
    Native,
    /// Emulated through prompt instructions and free-text JSON extraction
    Simulated,
}

/// Uniform interface over every LLM provider
///
/// Implementations hold only configuration and a lazily created HTTP client;
/// no conversation state survives a call, so one instance can serve many
/// concurrent callers.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Stable provider identifier (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Capability class of this provider
    fn function_calling(&self) -> FunctionCalling;

    /// Plain text completion
    async fn complete(&self, messages: &[Message], options: &CompletionOptions) -> GatewayResult<String>;

    /// Completion that may resolve to a function call
    ///
    /// A returned `FunctionCall` always has a JSON-object `arguments` value.
    async fn complete_with_functions(
        &self,
        messages: &[Message],
        functions: &[FunctionDefinition],
        options: &CompletionOptions,
    ) -> GatewayResult<Completion>;

    /// Cheapest round-trip that proves the credential works
    ///
    /// Returns `Ok(false)` for a rejected credential; errors only on
    /// transport failure.
    async fn validate_credential(&self) -> GatewayResult<bool>;

    /// Logger that receives this adapter's diagnostics
    fn logger(&self) -> SharedLogger {
        default_logger()
    }

    /// Liveness probe that never fails
    async fn health_check(&self) -> bool {
        match self.validate_credential().await {
            Ok(valid) => valid,
            Err(err) => {
                crate::log_warn!(self.logger(), "[{}] health check failed: {}", self.provider_name(), err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-123");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(key.expose(), "sk-secret-123");
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = AdapterConfig::new("gpt-4o").with_api_base("http://localhost:8080/v1/");
        assert_eq!(config.base_url("https://unused"), "http://localhost:8080/v1");

        let default = AdapterConfig::new("gpt-4o");
        assert_eq!(default.base_url("https://api.openai.com/v1"), "https://api.openai.com/v1");
        assert_eq!(default.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_options_builder() {
        let options = CompletionOptions::new()
            .with_max_tokens(256)
            .with_temperature(0.2)
            .with_extra("top_p", json!(0.9));

        assert_eq!(options.max_tokens, Some(256));
        assert_eq!(options.extra.unwrap()["top_p"], json!(0.9));
    }
}
