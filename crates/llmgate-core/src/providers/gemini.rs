//! Gemini `generateContent` dialect (simulated function calling)
//!
//! This wire has no system role: system content is demoted to user turns
//! and the function block becomes a leading user turn. The credential is
//! sent as the `key` query parameter.

use reqwest::StatusCode;
use serde_json::{json, Map, Value};

use super::error::ErrorKind;
use super::http;
use super::simulated::{Prompt, SimulatedAdapter, SimulatedDialect, SystemPlacement, TurnRole};
use super::traits::{ApiKey, CompletionOptions};

/// Gemini wire dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct Gemini;

/// Adapter for Gemini models
pub type GeminiAdapter = SimulatedAdapter<Gemini>;

impl SimulatedDialect for Gemini {
    const PROVIDER_ID: &'static str = "gemini";
    const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    const SYSTEM_PLACEMENT: SystemPlacement = SystemPlacement::LeadingUserTurn;

    fn completion_request(
        client: &reqwest::Client,
        base_url: &str,
        api_key: &ApiKey,
        model: &str,
        prompt: &Prompt,
        options: &CompletionOptions,
    ) -> reqwest::RequestBuilder {
        client
            .post(format!("{}/models/{}:generateContent", base_url, model))
            .query(&[("key", api_key.expose())])
            .json(&request_body(prompt, options))
    }

    fn credential_request(client: &reqwest::Client, base_url: &str, api_key: &ApiKey) -> reqwest::RequestBuilder {
        client
            .get(format!("{}/models", base_url))
            .query(&[("key", api_key.expose()), ("pageSize", "1")])
    }

    fn reply_text(body: &Value) -> Option<String> {
        let parts = body
            .get("candidates")?
            .as_array()?
            .first()?
            .get("content")?
            .get("parts")?
            .as_array()?;

        Some(
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(""),
        )
    }

    fn classify(status: StatusCode, body: &str) -> ErrorKind {
        // Bad keys come back as 400 with a reason in the body
        if status == StatusCode::BAD_REQUEST
            && (body.contains("API_KEY_INVALID") || body.contains("API key not valid"))
        {
            return ErrorKind::Authentication;
        }
        http::classify_status(status)
    }
}

fn request_body(prompt: &Prompt, options: &CompletionOptions) -> Value {
    let contents: Vec<Value> = prompt
        .turns
        .iter()
        .map(|turn| {
            let role = match turn.role {
                TurnRole::User => "user",
                TurnRole::Assistant => "model",
            };
            json!({ "role": role, "parts": [{ "text": turn.text }] })
        })
        .collect();

    let mut generation = Map::new();
    if let Some(max_tokens) = options.max_tokens {
        generation.insert("maxOutputTokens".to_string(), json!(max_tokens));
    }
    if let Some(temperature) = options.temperature {
        generation.insert("temperature".to_string(), json!(temperature));
    }

    let mut body = json!({ "contents": contents });
    if !generation.is_empty() {
        body["generationConfig"] = Value::Object(generation);
    }
    http::merge_extra(&mut body, options.extra.as_ref());
    body
}
