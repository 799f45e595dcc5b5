//! Adapter profile configuration
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: YAML file (`~/.config/llmgate/config.yaml`)

mod traits;
mod memory;
mod file;

pub use traits::{AdapterProfile, ConfigProvider, ConfigError, ConfigResult};
pub use memory::MemoryConfigProvider;
pub use file::{FileConfigProvider, ConfigFile};
