//! Logging abstractions
//!
//! Adapters log through an injected [`Logger`]. [`TracingLogger`] forwards
//! to the `tracing` ecosystem and is the default; [`NoOpLogger`] is for tests.

mod traits;
mod noop;
mod tracing_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use tracing_logger::TracingLogger;

/// The logger used when the caller does not supply one
pub fn default_logger() -> SharedLogger {
    std::sync::Arc::new(TracingLogger::new())
}
