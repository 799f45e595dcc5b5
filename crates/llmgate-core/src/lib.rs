//! llmgate core
//!
//! One interface for text completions and function calling across LLM
//! providers whose wire protocols disagree.
//!
//! - [`providers`]: the [`Adapter`] trait, native and simulated adapters,
//!   and the [`AdapterFactory`] that picks between them per provider
//! - [`types`]: provider-neutral messages, function definitions and calls
//! - [`config`] / [`secrets`]: adapter profiles and credential lookup
//! - [`logging`]: the injectable [`Logger`] seam, backed by `tracing`
//!
//! ```rust,no_run
//! use llmgate_core::{Adapter, AdapterConfig, AdapterFactory, ApiKey, Completion, CompletionOptions, FunctionDefinition, Message};
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = AdapterFactory::default();
//! let adapter = factory.create("gemini", ApiKey::new("..."), AdapterConfig::new("gemini-1.5-flash"))?;
//!
//! let weather = FunctionDefinition::new("get_weather", "Current weather for a city")
//!     .with_parameters(json!({ "type": "object", "properties": { "city": { "type": "string" } } }));
//!
//! match adapter
//!     .complete_with_functions(&[Message::user("Weather in Paris?")], &[weather], &CompletionOptions::new())
//!     .await?
//! {
//!     Completion::FunctionCall { call } => println!("call {} with {:?}", call.name, call.arguments),
//!     Completion::Text { text } => println!("{}", text),
//! }
//! # Ok(())
//! # }
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;

// Re-export commonly used types
pub use types::{
    CancellationToken, Completion, FunctionCall, FunctionDefinition, Message, MessageError, MessageRole,
};

pub use providers::{
    Adapter, AdapterConfig, AdapterFactory, ApiKey, CompletionOptions, ErrorKind, FunctionCalling, GatewayError,
    GatewayResult, MockAdapter, MockMode,
};

pub use secrets::{ChainSecretStore, EnvSecretStore, MemorySecretStore, SecretStore, SecretStoreError};

pub use logging::{Logger, NoOpLogger, SharedLogger, TracingLogger};

pub use config::{AdapterProfile, ConfigError, ConfigProvider, FileConfigProvider, MemoryConfigProvider};
