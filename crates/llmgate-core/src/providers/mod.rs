//! Provider adapters
//!
//! Every provider sits behind the [`Adapter`] trait. Two variants exist:
//!
//! - native: [`OpenAiAdapter`] sends `functions` on the wire and parses
//!   structured `function_call` replies, failing loudly on bad arguments
//! - simulated: [`SimulatedAdapter`] describes the functions in the prompt
//!   and extracts `{"function_call": ...}` from free text, degrading to a
//!   text answer when extraction fails ([`AnthropicAdapter`], [`GeminiAdapter`])
//!
//! [`AdapterFactory`] picks the variant per provider id. [`MockAdapter`] is
//! registered as `mock` for tests.

mod traits;
mod error;
mod http;
mod extract;
mod simulated;
mod openai;
mod anthropic;
mod gemini;
mod mock;
mod factory;

use std::future::Future;

pub use traits::{Adapter, AdapterConfig, ApiKey, CompletionOptions, FunctionCalling, DEFAULT_TIMEOUT};
pub use error::{BoxError, ErrorKind, GatewayError, GatewayResult, WireStatus};
pub use extract::{extract_function_call, FUNCTION_CALL_MARKER};
pub use simulated::{
    build_prompt, render_function_block, Prompt, SimulatedAdapter, SimulatedDialect, SystemPlacement, Turn,
    TurnRole,
};
pub use openai::{OpenAiAdapter, OPENAI_COMPATIBLE_PROVIDER_ID, OPENAI_PROVIDER_ID};
pub use anthropic::{Anthropic, AnthropicAdapter};
pub use gemini::{Gemini, GeminiAdapter};
pub use mock::{MockAdapter, MockMode, MOCK_PROVIDER_ID};
pub use factory::{AdapterConstructor, AdapterFactory};

use crate::types::CancellationToken;

/// Run an adapter call until it finishes or `token` is cancelled
///
/// On cancellation the call's future is dropped, which aborts the request
/// and releases its connection, and a `Cancelled` error is returned.
///
/// ```no_run
/// # async fn demo(adapter: &dyn llmgate_core::Adapter) {
/// use llmgate_core::{providers::cancellable, CancellationToken, CompletionOptions, Message};
///
/// let token = CancellationToken::new();
/// let messages = [Message::user("Hi")];
/// let reply = cancellable(&token, adapter.provider_name(), adapter.complete(&messages, &CompletionOptions::new())).await;
/// # }
/// ```
pub async fn cancellable<T, F>(token: &CancellationToken, provider: &str, call: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    if token.is_cancelled() {
        return Err(GatewayError::cancelled(provider));
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(GatewayError::cancelled(provider)),
        result = call => result,
    }
}
