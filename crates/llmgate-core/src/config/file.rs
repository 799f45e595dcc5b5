//! File-based configuration provider (YAML)
//!
//! Default location is `~/.config/llmgate/config.yaml` (the platform config
//! directory as reported by `dirs`).

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::traits::{AdapterProfile, ConfigError, ConfigProvider, ConfigResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    /// Configured adapter profiles
    #[serde(default)]
    pub profiles: Vec<AdapterProfile>,

    /// Profile used when the caller names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
}

/// File-based configuration provider
///
/// Reads are served from an in-memory cache populated on first use;
/// writes go to disk and refresh the cache.
///
/// # Example
///
/// ```no_run
/// use llmgate_core::config::FileConfigProvider;
///
/// let config = FileConfigProvider::user();
/// println!("{}", config.path().display());
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider (~/.config/llmgate/config.yaml)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("llmgate").join("config.yaml"))
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    /// Get cached or load config
    pub fn config(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }

        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// The default profile, if one is named and present
    pub fn default_profile(&self) -> ConfigResult<Option<AdapterProfile>> {
        let config = self.config()?;
        Ok(config.default_profile.as_deref().and_then(|name| {
            config.profiles.iter().find(|p| p.matches(name)).cloned()
        }))
    }

    /// Set the default profile name
    pub fn set_default_profile(&self, name: &str) -> ConfigResult<()> {
        let mut config = self.config()?;
        if !config.profiles.iter().any(|p| p.matches(name)) {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        config.default_profile = Some(name.to_string());
        self.save(&config)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn get_profiles(&self) -> ConfigResult<Vec<AdapterProfile>> {
        Ok(self.config()?.profiles)
    }

    async fn add_profile(&self, profile: AdapterProfile) -> ConfigResult<()> {
        let mut config = self.config()?;
        if config.profiles.iter().any(|p| p.matches(&profile.name)) {
            return Err(ConfigError::ProfileExists(profile.name));
        }
        config.profiles.push(profile);
        self.save(&config)
    }

    async fn update_profile(&self, name: &str, profile: AdapterProfile) -> ConfigResult<()> {
        let mut config = self.config()?;
        match config.profiles.iter().position(|p| p.matches(name)) {
            Some(pos) => {
                config.profiles[pos] = profile;
                self.save(&config)
            }
            None => Err(ConfigError::ProfileNotFound(name.to_string())),
        }
    }

    async fn remove_profile(&self, name: &str) -> ConfigResult<()> {
        let mut config = self.config()?;
        let original_len = config.profiles.len();
        config.profiles.retain(|p| !p.matches(name));

        if config.profiles.len() == original_len {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        if config.default_profile.as_deref().is_some_and(|d| d.eq_ignore_ascii_case(name)) {
            config.default_profile = None;
        }
        self.save(&config)
    }
}
