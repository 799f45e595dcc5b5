//! Adapter factory and provider registry

use std::collections::HashMap;

use crate::config::{AdapterProfile, ConfigError, ConfigResult};
use crate::logging::{default_logger, SharedLogger};
use crate::secrets::SecretStore;

use super::anthropic::AnthropicAdapter;
use super::gemini::GeminiAdapter;
use super::mock::{MockAdapter, MOCK_PROVIDER_ID};
use super::openai::{OpenAiAdapter, OPENAI_COMPATIBLE_PROVIDER_ID, OPENAI_PROVIDER_ID};
use super::traits::{Adapter, AdapterConfig, ApiKey, FunctionCalling};

/// Builds one adapter instance from a credential and per-instance config
pub type AdapterConstructor =
    Box<dyn Fn(ApiKey, AdapterConfig, SharedLogger) -> ConfigResult<Box<dyn Adapter>> + Send + Sync>;

struct Registration {
    function_calling: FunctionCalling,
    construct: AdapterConstructor,
}

/// Maps provider ids to adapter constructors
///
/// The capability class of each provider is fixed at registration, so
/// callers know whether function calls are native or simulated before an
/// adapter exists. Ids are case-insensitive. Existing mappings can never be
/// replaced, only new ones added.
///
/// # Example
///
/// ```
/// use llmgate_core::providers::{Adapter, AdapterConfig, AdapterFactory, ApiKey};
///
/// let factory = AdapterFactory::default();
/// let adapter = factory
///     .create("anthropic", ApiKey::new("sk-ant-..."), AdapterConfig::new("claude-3-5-haiku-latest"))
///     .unwrap();
/// assert_eq!(adapter.provider_name(), "anthropic");
/// ```
pub struct AdapterFactory {
    providers: HashMap<String, Registration>,
    logger: SharedLogger,
}

impl AdapterFactory {
    /// Factory with the built-in providers, passing `logger` to every adapter
    pub fn new(logger: SharedLogger) -> Self {
        let mut factory = Self {
            providers: HashMap::new(),
            logger,
        };

        factory.insert(OPENAI_PROVIDER_ID, FunctionCalling::Native, |key, config, logger| {
            Ok(Box::new(OpenAiAdapter::new(key, config, logger)))
        });
        factory.insert(OPENAI_COMPATIBLE_PROVIDER_ID, FunctionCalling::Native, |key, config, logger| {
            if config.api_base.is_none() {
                return Err(ConfigError::MissingSetting {
                    provider: OPENAI_COMPATIBLE_PROVIDER_ID.to_string(),
                    setting: "api_base",
                });
            }
            Ok(Box::new(OpenAiAdapter::compatible(key, config, logger)))
        });
        factory.insert("anthropic", FunctionCalling::Simulated, |key, config, logger| {
            Ok(Box::new(AnthropicAdapter::new(key, config, logger)))
        });
        factory.insert("gemini", FunctionCalling::Simulated, |key, config, logger| {
            Ok(Box::new(GeminiAdapter::new(key, config, logger)))
        });
        factory.insert(MOCK_PROVIDER_ID, FunctionCalling::Simulated, |_, _, logger| {
            Ok(Box::new(MockAdapter::echo(logger)))
        });

        factory
    }

    fn insert<F>(&mut self, id: &str, function_calling: FunctionCalling, construct: F)
    where
        F: Fn(ApiKey, AdapterConfig, SharedLogger) -> ConfigResult<Box<dyn Adapter>> + Send + Sync + 'static,
    {
        self.providers.insert(
            id.to_lowercase(),
            Registration {
                function_calling,
                construct: Box::new(construct),
            },
        );
    }

    /// Register an additional provider
    ///
    /// Fails with `ConfigError::ProviderExists` if the id is already mapped.
    pub fn register<F>(&mut self, id: &str, function_calling: FunctionCalling, construct: F) -> ConfigResult<()>
    where
        F: Fn(ApiKey, AdapterConfig, SharedLogger) -> ConfigResult<Box<dyn Adapter>> + Send + Sync + 'static,
    {
        if self.providers.contains_key(&id.to_lowercase()) {
            return Err(ConfigError::ProviderExists(id.to_string()));
        }
        self.insert(id, function_calling, construct);
        crate::log_info!(self.logger, "registered provider: {} ({:?})", id, function_calling);
        Ok(())
    }

    /// Create an adapter for `provider`
    pub fn create(&self, provider: &str, credential: ApiKey, config: AdapterConfig) -> ConfigResult<Box<dyn Adapter>> {
        let registration = self
            .providers
            .get(&provider.to_lowercase())
            .ok_or_else(|| ConfigError::UnknownProvider(provider.to_string()))?;

        crate::log_debug!(self.logger, "creating adapter: provider={}, model={}", provider, config.model);
        (registration.construct)(credential, config, self.logger.clone())
    }

    /// Create an adapter from a profile, looking the credential up in `secrets`
    pub fn create_from_profile(
        &self,
        profile: &AdapterProfile,
        secrets: &dyn SecretStore,
    ) -> ConfigResult<Box<dyn Adapter>> {
        let credential = match secrets.get(profile.credential_key()) {
            Some(key) => key,
            // The mock never touches the network
            None if profile.provider.eq_ignore_ascii_case(MOCK_PROVIDER_ID) => ApiKey::new(""),
            None => return Err(ConfigError::MissingCredential(profile.credential_key().to_string())),
        };

        self.create(&profile.provider, credential, profile.adapter_config())
    }

    /// Registered provider ids, sorted
    pub fn providers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Capability class of a registered provider
    pub fn function_calling_for(&self, provider: &str) -> Option<FunctionCalling> {
        self.providers
            .get(&provider.to_lowercase())
            .map(|r| r.function_calling)
    }
}

impl Default for AdapterFactory {
    fn default() -> Self {
        Self::new(default_logger())
    }
}

impl std::fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("providers", &self.providers())
            .finish()
    }
}
