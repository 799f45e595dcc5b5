//! Mock adapter for testing
//!
//! Deterministic, scripted responses without network access. Callers use it
//! to exercise their function-dispatch loops; `Reply` mode runs raw text
//! through the same extraction as the simulated providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::logging::SharedLogger;
use crate::types::{Completion, FunctionCall, FunctionDefinition, Message, MessageRole};

use super::error::{ErrorKind, GatewayError, GatewayResult};
use super::extract::extract_function_call;
use super::traits::{Adapter, CompletionOptions, FunctionCalling};

pub const MOCK_PROVIDER_ID: &str = "mock";

/// Mock response mode
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed text response
    Fixed(String),
    /// Return this function call whenever functions are supplied
    Call(FunctionCall),
    /// Return raw model output, decoded like a simulated provider reply
    Reply(String),
    /// Fail every call with this kind
    Error(ErrorKind),
}

/// Scripted in-process adapter
pub struct MockAdapter {
    mode: MockMode,
    delay: Duration,
    calls: AtomicUsize,
    logger: SharedLogger,
}

impl MockAdapter {
    pub fn new(mode: MockMode, logger: SharedLogger) -> Self {
        Self {
            mode,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            logger,
        }
    }

    /// Create an echo adapter
    pub fn echo(logger: SharedLogger) -> Self {
        Self::new(MockMode::Echo, logger)
    }

    /// Create a fixed-response adapter
    pub fn fixed(response: impl Into<String>, logger: SharedLogger) -> Self {
        Self::new(MockMode::Fixed(response.into()), logger)
    }

    /// Create an adapter that always calls `call`
    pub fn call(call: FunctionCall, logger: SharedLogger) -> Self {
        Self::new(MockMode::Call(call), logger)
    }

    /// Create an adapter that replies with raw model output
    pub fn reply(raw: impl Into<String>, logger: SharedLogger) -> Self {
        Self::new(MockMode::Reply(raw.into()), logger)
    }

    /// Create an error-producing adapter
    pub fn error(kind: ErrorKind, logger: SharedLogger) -> Self {
        Self::new(MockMode::Error(kind), logger)
    }

    /// Simulated latency before every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn mode(&self) -> &MockMode {
        &self.mode
    }

    /// Completion calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_user_message(messages: &[Message]) -> &str {
        messages
            .iter()
            .rev()
            .find(|m| m.role() == MessageRole::User && !m.content().is_empty())
            .map(|m| m.content())
            .unwrap_or("Hello from MockAdapter!")
    }

    async fn respond(&self, messages: &[Message]) -> GatewayResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.mode {
            MockMode::Echo => Ok(format!("Echo: {}", Self::last_user_message(messages))),
            MockMode::Fixed(text) | MockMode::Reply(text) => Ok(text.clone()),
            MockMode::Call(call) => Ok(format!("{}({})", call.name, call.arguments_json())),
            MockMode::Error(kind) => Err(GatewayError::new(*kind, MOCK_PROVIDER_ID, "scripted failure")),
        }
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    fn provider_name(&self) -> &str {
        MOCK_PROVIDER_ID
    }

    fn logger(&self) -> SharedLogger {
        self.logger.clone()
    }

    fn function_calling(&self) -> FunctionCalling {
        FunctionCalling::Simulated
    }

    async fn complete(&self, messages: &[Message], _options: &CompletionOptions) -> GatewayResult<String> {
        crate::log_debug!(self.logger, "[mock] complete: {} message(s)", messages.len());
        self.respond(messages).await
    }

    async fn complete_with_functions(
        &self,
        messages: &[Message],
        functions: &[FunctionDefinition],
        _options: &CompletionOptions,
    ) -> GatewayResult<Completion> {
        crate::log_debug!(self.logger, "[mock] complete_with_functions: {} function(s)", functions.len());
        let text = self.respond(messages).await?;

        if functions.is_empty() {
            return Ok(Completion::text(text));
        }

        Ok(match &self.mode {
            MockMode::Call(call) => Completion::call(call.clone()),
            MockMode::Reply(raw) => match extract_function_call(raw) {
                Some(call) => Completion::call(call),
                None => Completion::text(text),
            },
            _ => Completion::text(text),
        })
    }

    async fn validate_credential(&self) -> GatewayResult<bool> {
        Ok(self.mode != MockMode::Error(ErrorKind::Authentication))
    }
}
