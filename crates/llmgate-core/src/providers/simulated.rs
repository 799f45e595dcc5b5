//! Simulated function calling for providers without a native wire field
//!
//! Function definitions are rendered into an instruction block that the
//! model reads as ordinary prompt text, and replies are scanned for an
//! embedded `{"function_call": ...}` object (see [`super::extract`]).
//!
//! The wire format itself differs per provider, so [`SimulatedAdapter`] is
//! generic over a [`SimulatedDialect`] that only knows how to shape a
//! request, read the reply text and classify error statuses.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::logging::SharedLogger;
use crate::types::{Completion, FunctionCall, FunctionDefinition, Message, MessageRole};

use super::error::{ErrorKind, GatewayError, GatewayResult};
use super::extract::extract_function_call;
use super::http::{self, LazyClient};
use super::traits::{Adapter, AdapterConfig, ApiKey, CompletionOptions, FunctionCalling};

/// Where system content and the function block go for a dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemPlacement {
    /// The wire has a dedicated system field
    NativeField,
    /// No system role: system content becomes user turns and the function
    /// block a leading synthetic user turn
    LeadingUserTurn,
}

/// Speaker of a provider-neutral turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

/// One outbound turn after role mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    fn user(text: impl Into<String>) -> Self {
        Self { role: TurnRole::User, text: text.into() }
    }

    fn assistant(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Assistant, text: text.into() }
    }
}

/// Conversation after role mapping, ready for a dialect to serialize
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    /// Content for the provider's system field (`NativeField` dialects only)
    pub system: Option<String>,
    pub turns: Vec<Turn>,
}

/// Wire details of one simulated provider
pub trait SimulatedDialect: Send + Sync + 'static {
    /// Provider identifier (e.g., "anthropic")
    const PROVIDER_ID: &'static str;

    /// Default base URL, without trailing slash
    const DEFAULT_BASE_URL: &'static str;

    /// Where system content lands
    const SYSTEM_PLACEMENT: SystemPlacement;

    /// Build the completion request
    fn completion_request(
        client: &reqwest::Client,
        base_url: &str,
        api_key: &ApiKey,
        model: &str,
        prompt: &Prompt,
        options: &CompletionOptions,
    ) -> reqwest::RequestBuilder;

    /// Build the cheapest request that exercises the credential
    fn credential_request(client: &reqwest::Client, base_url: &str, api_key: &ApiKey) -> reqwest::RequestBuilder;

    /// Read the reply text from a success body, `None` if the shape is wrong
    fn reply_text(body: &Value) -> Option<String>;

    /// Classify a non-success status
    fn classify(status: StatusCode, _body: &str) -> ErrorKind {
        http::classify_status(status)
    }
}

/// Render function definitions and the reply-format instruction
pub fn render_function_block(functions: &[FunctionDefinition]) -> String {
    let mut block = String::from("You can call the following functions:\n");

    for function in functions {
        block.push_str(&format!(
            "\nFunction: {}\nDescription: {}\nParameters (JSON Schema): {}\n",
            function.name, function.description, function.parameters
        ));
    }

    block.push_str(
        "\nTo call a function, reply with exactly one JSON object of the form \
         {\"function_call\": {\"name\": \"<function name>\", \"arguments\": {<arguments object>}}} \
         and nothing else. If you do not need a function, reply with ordinary text and do not \
         include that JSON object.",
    );
    block
}

/// The reply an assistant would have produced to issue `call`
fn render_call(call: &FunctionCall) -> String {
    serde_json::json!({
        "function_call": {
            "name": call.name,
            "arguments": call.arguments,
        }
    })
    .to_string()
}

/// Map gateway messages onto a dialect's role conventions
///
/// Function-role messages have no channel on these wires and are dropped;
/// empty turns are skipped. Returns the prompt and the number of dropped
/// function messages.
pub fn build_prompt(
    messages: &[Message],
    function_block: Option<String>,
    placement: SystemPlacement,
) -> (Prompt, usize) {
    let mut system_parts: Vec<String> = Vec::new();
    let mut turns: Vec<Turn> = Vec::new();
    let mut dropped = 0;

    if placement == SystemPlacement::LeadingUserTurn {
        if let Some(block) = &function_block {
            turns.push(Turn::user(block.clone()));
        }
    }

    for message in messages {
        match message.role() {
            MessageRole::System => match placement {
                SystemPlacement::NativeField => system_parts.push(message.content().to_string()),
                SystemPlacement::LeadingUserTurn => turns.push(Turn::user(message.content())),
            },
            MessageRole::User => turns.push(Turn::user(message.content())),
            MessageRole::Assistant => match message.function_call() {
                Some(call) => turns.push(Turn::assistant(render_call(call))),
                None => turns.push(Turn::assistant(message.content())),
            },
            MessageRole::Function => dropped += 1,
        }
    }

    if placement == SystemPlacement::NativeField {
        if let Some(block) = function_block {
            system_parts.push(block);
        }
    }

    turns.retain(|turn| !turn.text.trim().is_empty());
    system_parts.retain(|part| !part.trim().is_empty());

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (Prompt { system, turns }, dropped)
}

/// Adapter for providers that emulate function calling in prompt text
pub struct SimulatedAdapter<D: SimulatedDialect> {
    api_key: ApiKey,
    config: AdapterConfig,
    client: LazyClient,
    logger: SharedLogger,
    _dialect: PhantomData<D>,
}

impl<D: SimulatedDialect> SimulatedAdapter<D> {
    pub fn new(api_key: ApiKey, config: AdapterConfig, logger: SharedLogger) -> Self {
        let client = LazyClient::new(config.timeout);
        Self {
            api_key,
            config,
            client,
            logger,
            _dialect: PhantomData,
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn base_url(&self) -> String {
        self.config.base_url(D::DEFAULT_BASE_URL)
    }

    /// Role-map, send, and return the raw reply text
    async fn send_prompt(
        &self,
        messages: &[Message],
        function_block: Option<String>,
        options: &CompletionOptions,
    ) -> GatewayResult<String> {
        let (prompt, dropped) = build_prompt(messages, function_block, D::SYSTEM_PLACEMENT);
        if dropped > 0 {
            crate::log_debug!(
                self.logger,
                "[{}] dropped {} function message(s): no wire channel",
                D::PROVIDER_ID,
                dropped
            );
        }

        let client = self.client.get(D::PROVIDER_ID)?;
        let request = D::completion_request(
            client,
            &self.base_url(),
            &self.api_key,
            &self.config.model,
            &prompt,
            options,
        );

        crate::log_debug!(
            self.logger,
            "[{}] completion request: model={}, turns={}",
            D::PROVIDER_ID,
            self.config.model,
            prompt.turns.len()
        );

        let body = http::send_json(D::PROVIDER_ID, &self.api_key, request, D::classify)
            .await
            .map_err(|err| {
                crate::log_warn!(self.logger, "[{}] completion failed: {}", D::PROVIDER_ID, err.kind);
                err
            })?;

        D::reply_text(&body).ok_or_else(|| {
            crate::log_error!(self.logger, "[{}] response carried no reply text", D::PROVIDER_ID);
            GatewayError::provider_error(D::PROVIDER_ID, "unexpected response shape: no reply text")
        })
    }
}

#[async_trait]
impl<D: SimulatedDialect> Adapter for SimulatedAdapter<D> {
    fn provider_name(&self) -> &str {
        D::PROVIDER_ID
    }

    fn logger(&self) -> SharedLogger {
        self.logger.clone()
    }

    fn function_calling(&self) -> FunctionCalling {
        FunctionCalling::Simulated
    }

    async fn complete(&self, messages: &[Message], options: &CompletionOptions) -> GatewayResult<String> {
        self.send_prompt(messages, None, options).await
    }

    async fn complete_with_functions(
        &self,
        messages: &[Message],
        functions: &[FunctionDefinition],
        options: &CompletionOptions,
    ) -> GatewayResult<Completion> {
        if functions.is_empty() {
            return self.complete(messages, options).await.map(Completion::text);
        }

        let block = render_function_block(functions);
        let reply = self.send_prompt(messages, Some(block), options).await?;

        Ok(match extract_function_call(&reply) {
            Some(call) => {
                crate::log_info!(self.logger, "[{}] extracted function call: {}", D::PROVIDER_ID, call.name);
                Completion::call(call)
            }
            None => Completion::text(reply),
        })
    }

    async fn validate_credential(&self) -> GatewayResult<bool> {
        let client = self.client.get(D::PROVIDER_ID)?;
        let request = D::credential_request(client, &self.base_url(), &self.api_key);
        http::check_credential(D::PROVIDER_ID, &self.logger, request, D::classify).await
    }
}
