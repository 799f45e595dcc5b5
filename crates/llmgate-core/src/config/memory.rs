//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{AdapterProfile, ConfigError, ConfigProvider, ConfigResult};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    profiles: RwLock<Vec<AdapterProfile>>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial profiles
    pub fn with_profiles(profiles: Vec<AdapterProfile>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
        }
    }

    /// Clear all profiles
    pub fn clear(&self) {
        self.profiles.write().clear();
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn get_profiles(&self) -> ConfigResult<Vec<AdapterProfile>> {
        Ok(self.profiles.read().clone())
    }

    async fn add_profile(&self, profile: AdapterProfile) -> ConfigResult<()> {
        let mut guard = self.profiles.write();
        if guard.iter().any(|p| p.matches(&profile.name)) {
            return Err(ConfigError::ProfileExists(profile.name));
        }
        guard.push(profile);
        Ok(())
    }

    async fn update_profile(&self, name: &str, profile: AdapterProfile) -> ConfigResult<()> {
        let mut guard = self.profiles.write();
        match guard.iter().position(|p| p.matches(name)) {
            Some(pos) => {
                guard[pos] = profile;
                Ok(())
            }
            None => Err(ConfigError::ProfileNotFound(name.to_string())),
        }
    }

    async fn remove_profile(&self, name: &str) -> ConfigResult<()> {
        let mut guard = self.profiles.write();
        let original_len = guard.len();
        guard.retain(|p| !p.matches(name));

        if guard.len() == original_len {
            Err(ConfigError::ProfileNotFound(name.to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_config_provider() {
        let config = MemoryConfigProvider::new();
        assert!(config.get_profiles().await.unwrap().is_empty());

        config
            .add_profile(AdapterProfile::new("fast", "openai", "gpt-4o-mini"))
            .await
            .unwrap();

        // Names are case-insensitive
        assert!(matches!(
            config.add_profile(AdapterProfile::new("FAST", "gemini", "gemini-1.5-flash")).await,
            Err(ConfigError::ProfileExists(_))
        ));

        config
            .update_profile("fast", AdapterProfile::new("fast", "anthropic", "claude-3-5-haiku-latest"))
            .await
            .unwrap();
        assert_eq!(config.get_profile("Fast").await.unwrap().provider, "anthropic");

        config.remove_profile("fast").await.unwrap();
        assert!(matches!(
            config.remove_profile("fast").await,
            Err(ConfigError::ProfileNotFound(_))
        ));
        assert!(matches!(
            config.get_profile("fast").await,
            Err(ConfigError::ProfileNotFound(_))
        ));
    }
}
