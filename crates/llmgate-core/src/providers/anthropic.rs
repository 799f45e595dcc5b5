//! Anthropic Messages API dialect (simulated function calling)
//!
//! System content and the function block go into the top-level `system`
//! field; credentials travel in the `x-api-key` header.

use reqwest::StatusCode;
use serde_json::{json, Value};

use super::error::ErrorKind;
use super::http;
use super::simulated::{Prompt, SimulatedAdapter, SimulatedDialect, SystemPlacement, TurnRole};
use super::traits::{ApiKey, CompletionOptions};

const API_VERSION: &str = "2023-06-01";

/// `max_tokens` is mandatory on this wire
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic wire dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct Anthropic;

/// Adapter for Anthropic models
pub type AnthropicAdapter = SimulatedAdapter<Anthropic>;

impl SimulatedDialect for Anthropic {
    const PROVIDER_ID: &'static str = "anthropic";
    const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com/v1";
    const SYSTEM_PLACEMENT: SystemPlacement = SystemPlacement::NativeField;

    fn completion_request(
        client: &reqwest::Client,
        base_url: &str,
        api_key: &ApiKey,
        model: &str,
        prompt: &Prompt,
        options: &CompletionOptions,
    ) -> reqwest::RequestBuilder {
        let body = request_body(model, prompt, options);
        client
            .post(format!("{}/messages", base_url))
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", API_VERSION)
            .json(&body)
    }

    fn credential_request(client: &reqwest::Client, base_url: &str, api_key: &ApiKey) -> reqwest::RequestBuilder {
        client
            .get(format!("{}/models", base_url))
            .header("x-api-key", api_key.expose())
            .header("anthropic-version", API_VERSION)
    }

    fn reply_text(body: &Value) -> Option<String> {
        let blocks = body.get("content")?.as_array()?;
        Some(
            blocks
                .iter()
                .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(""),
        )
    }

    fn classify(status: StatusCode, _body: &str) -> ErrorKind {
        // 529: overloaded
        match status.as_u16() {
            529 => ErrorKind::RateLimited,
            _ => http::classify_status(status),
        }
    }
}

fn request_body(model: &str, prompt: &Prompt, options: &CompletionOptions) -> Value {
    let messages: Vec<Value> = prompt
        .turns
        .iter()
        .map(|turn| {
            let role = match turn.role {
                TurnRole::User => "user",
                TurnRole::Assistant => "assistant",
            };
            json!({ "role": role, "content": turn.text })
        })
        .collect();

    let mut body = json!({
        "model": model,
        "messages": messages,
        "max_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    });
    if let Some(system) = &prompt.system {
        body["system"] = json!(system);
    }
    if let Some(temperature) = options.temperature {
        body["temperature"] = json!(temperature);
    }
    http::merge_extra(&mut body, options.extra.as_ref());
    body
}
