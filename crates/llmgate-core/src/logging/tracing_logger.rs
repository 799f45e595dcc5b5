//! Logger backed by the `tracing` crate

use super::traits::Logger;

/// Forwards log lines to `tracing` events
///
/// Every event carries the `llmgate` target and a `component` field so
/// subscribers can filter gateway output (e.g. `RUST_LOG=llmgate=debug`).
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingLogger {
    pub fn new() -> Self {
        Self {
            component: "gateway".to_string(),
        }
    }

    /// Create a logger that tags events with a custom component name
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "llmgate", component = %self.component, "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "llmgate", component = %self.component, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "llmgate", component = %self.component, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "llmgate", component = %self.component, "{}", message);
    }
}
