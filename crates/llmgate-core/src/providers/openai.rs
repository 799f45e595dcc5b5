//! OpenAI chat-completions adapter (native function calling)
//!
//! Serves both `openai` and `openai-compatible`: the wire is identical, only
//! the provider id and the base URL differ.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logging::SharedLogger;
use crate::types::{Completion, FunctionCall, FunctionDefinition, Message, MessageRole};

use super::error::{GatewayError, GatewayResult};
use super::http::{self, LazyClient};
use super::traits::{Adapter, AdapterConfig, ApiKey, CompletionOptions, FunctionCalling};

pub const OPENAI_PROVIDER_ID: &str = "openai";
pub const OPENAI_COMPATIBLE_PROVIDER_ID: &str = "openai-compatible";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// Request wire types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<WireFunction<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    // Serialized as null for assistant calls
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<WireCall>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

// Response wire types

#[derive(Debug, Serialize, Deserialize)]
struct WireCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<WireCall>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: WireCall,
}

fn wire_message(message: &Message) -> WireMessage<'_> {
    match (message.role(), message.function_call()) {
        (MessageRole::Assistant, Some(call)) => WireMessage {
            role: "assistant",
            content: None,
            name: None,
            function_call: Some(WireCall {
                name: call.name.clone(),
                arguments: call.arguments_json(),
            }),
        },
        (role, _) => WireMessage {
            role: match role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::Function => "function",
            },
            content: Some(message.content()),
            name: message.name(),
            function_call: None,
        },
    }
}

/// Parse the JSON-encoded arguments string of a native call
///
/// An empty string means "no arguments". Anything else must decode to a
/// JSON object, otherwise the call is malformed.
fn parse_arguments(provider: &str, call: &WireCall) -> GatewayResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(&call.arguments) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(_) => Err(GatewayError::malformed_function_call(
            provider,
            format!("arguments for `{}` are not a JSON object", call.name),
        )),
        Err(err) => Err(GatewayError::malformed_function_call(
            provider,
            format!("arguments for `{}` are not valid JSON", call.name),
        )
        .with_cause(err)),
    }
}

/// Adapter for the OpenAI chat-completions protocol
pub struct OpenAiAdapter {
    provider_id: &'static str,
    api_key: ApiKey,
    config: AdapterConfig,
    client: LazyClient,
    logger: SharedLogger,
}

impl OpenAiAdapter {
    /// Adapter for api.openai.com (or `config.api_base` when set)
    pub fn new(api_key: ApiKey, config: AdapterConfig, logger: SharedLogger) -> Self {
        Self::with_provider_id(OPENAI_PROVIDER_ID, api_key, config, logger)
    }

    /// Adapter for a self-hosted or third-party OpenAI-compatible endpoint
    ///
    /// The factory insists on `api_base` for this provider.
    pub fn compatible(api_key: ApiKey, config: AdapterConfig, logger: SharedLogger) -> Self {
        Self::with_provider_id(OPENAI_COMPATIBLE_PROVIDER_ID, api_key, config, logger)
    }

    fn with_provider_id(
        provider_id: &'static str,
        api_key: ApiKey,
        config: AdapterConfig,
        logger: SharedLogger,
    ) -> Self {
        let client = LazyClient::new(config.timeout);
        Self {
            provider_id,
            api_key,
            config,
            client,
            logger,
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn base_url(&self) -> String {
        self.config.base_url(DEFAULT_BASE_URL)
    }

    fn request_body(
        &self,
        messages: &[Message],
        functions: &[FunctionDefinition],
        options: &CompletionOptions,
    ) -> GatewayResult<Value> {
        let declared = !functions.is_empty();
        let request = ChatRequest {
            model: &self.config.model,
            messages: messages.iter().map(wire_message).collect(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            functions: declared.then(|| {
                functions
                    .iter()
                    .map(|f| WireFunction {
                        name: &f.name,
                        description: &f.description,
                        parameters: &f.parameters,
                    })
                    .collect()
            }),
            function_call: declared.then_some("auto"),
        };

        let mut body = serde_json::to_value(&request).map_err(|e| {
            GatewayError::provider_error(self.provider_id, "failed to encode request").with_cause(e)
        })?;
        http::merge_extra(&mut body, options.extra.as_ref());
        Ok(body)
    }

    async fn chat(&self, body: Value) -> GatewayResult<ResponseMessage> {
        let client = self.client.get(self.provider_id)?;
        let request = client
            .post(format!("{}/chat/completions", self.base_url()))
            .bearer_auth(self.api_key.expose())
            .json(&body);

        crate::log_debug!(
            self.logger,
            "[{}] chat request: model={}",
            self.provider_id,
            self.config.model
        );

        let value = http::send_json(self.provider_id, &self.api_key, request, |status, _| {
            http::classify_status(status)
        })
        .await
        .map_err(|err| {
            crate::log_warn!(self.logger, "[{}] chat failed: {}", self.provider_id, err.kind);
            err
        })?;

        let response: ChatResponse = serde_json::from_value(value).map_err(|e| {
            crate::log_error!(self.logger, "[{}] unexpected response shape: {}", self.provider_id, e);
            GatewayError::provider_error(self.provider_id, "unexpected response shape").with_cause(e)
        })?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                crate::log_error!(self.logger, "[{}] response contained no choices", self.provider_id);
                GatewayError::provider_error(self.provider_id, "response contained no choices")
            })
    }
}

#[async_trait]
impl Adapter for OpenAiAdapter {
    fn provider_name(&self) -> &str {
        self.provider_id
    }

    fn logger(&self) -> SharedLogger {
        self.logger.clone()
    }

    fn function_calling(&self) -> FunctionCalling {
        FunctionCalling::Native
    }

    async fn complete(&self, messages: &[Message], options: &CompletionOptions) -> GatewayResult<String> {
        let body = self.request_body(messages, &[], options)?;
        let message = self.chat(body).await?;
        Ok(message.content.unwrap_or_default())
    }

    async fn complete_with_functions(
        &self,
        messages: &[Message],
        functions: &[FunctionDefinition],
        options: &CompletionOptions,
    ) -> GatewayResult<Completion> {
        let body = self.request_body(messages, functions, options)?;
        let message = self.chat(body).await?;

        let call = message.function_call.or_else(|| {
            message
                .tool_calls
                .and_then(|calls| calls.into_iter().next())
                .map(|tool| tool.function)
        });

        match call {
            Some(call) => {
                let arguments = parse_arguments(self.provider_id, &call).map_err(|err| {
                    crate::log_warn!(self.logger, "[{}] malformed function call: {}", self.provider_id, call.name);
                    err
                })?;
                crate::log_info!(self.logger, "[{}] function call: {}", self.provider_id, call.name);
                Ok(Completion::call(FunctionCall::new(call.name, arguments)))
            }
            None => Ok(Completion::text(message.content.unwrap_or_default())),
        }
    }

    async fn validate_credential(&self) -> GatewayResult<bool> {
        let client = self.client.get(self.provider_id)?;
        let request = client
            .get(format!("{}/models", self.base_url()))
            .bearer_auth(self.api_key.expose());
        http::check_credential(self.provider_id, &self.logger, request, |status, _| http::classify_status(status)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::providers::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn adapter() -> OpenAiAdapter {
        OpenAiAdapter::new(
            ApiKey::new("sk-test"),
            AdapterConfig::new("gpt-4o-mini"),
            Arc::new(NoOpLogger::new()),
        )
    }

    fn call(arguments: &str) -> WireCall {
        WireCall {
            name: "get_weather".to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[test]
    fn test_plain_request_omits_functions() {
        let body = adapter()
            .request_body(
                &[Message::system("Be terse"), Message::user("Say hi in one word")],
                &[],
                &CompletionOptions::new().with_max_tokens(5),
            )
            .unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "Be terse" },
                    { "role": "user", "content": "Say hi in one word" }
                ],
                "max_tokens": 5
            })
        );
    }

    #[test]
    fn test_function_request_shape() {
        let weather = FunctionDefinition::new("get_weather", "Weather lookup").with_parameters(json!({
            "type": "object",
            "properties": { "city": { "type": "string" } }
        }));
        let body = adapter()
            .request_body(&[Message::user("Weather?")], &[weather], &CompletionOptions::new())
            .unwrap();

        assert_eq!(body["function_call"], json!("auto"));
        assert_eq!(body["functions"][0]["name"], json!("get_weather"));
        assert_eq!(body["functions"][0]["parameters"]["properties"]["city"]["type"], json!("string"));
    }

    #[test]
    fn test_history_translation() {
        let mut args = Map::new();
        args.insert("city".to_string(), json!("Paris"));
        let messages = vec![
            Message::assistant_call(FunctionCall::new("get_weather", args)),
            Message::function("get_weather", "18C and sunny").unwrap(),
        ];

        let body = adapter().request_body(&messages, &[], &CompletionOptions::new()).unwrap();

        assert_eq!(
            body["messages"],
            json!([
                {
                    "role": "assistant",
                    "content": null,
                    "function_call": { "name": "get_weather", "arguments": "{\"city\":\"Paris\"}" }
                },
                { "role": "function", "content": "18C and sunny", "name": "get_weather" }
            ])
        );
    }

    #[test]
    fn test_extra_fields_are_merged() {
        let options = CompletionOptions::new().with_extra("top_p", json!(0.3));
        let body = adapter().request_body(&[Message::user("Hi")], &[], &options).unwrap();
        assert_eq!(body["top_p"], json!(0.3));
    }

    #[test]
    fn test_parse_arguments() {
        let parsed = parse_arguments("openai", &call(r#"{"city": "Paris"}"#)).unwrap();
        assert_eq!(parsed["city"], json!("Paris"));

        assert!(parse_arguments("openai", &call("{}")).unwrap().is_empty());

        for invalid in ["", "  ", "{\"city\": "] {
            let err = parse_arguments("openai", &call(invalid)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedFunctionCall);
        }
    }

    #[test]
    fn test_malformed_arguments_are_errors() {
        let err = parse_arguments("openai", &call("{city: Paris")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedFunctionCall);
        assert!(!err.message.contains("Paris"));

        let err = parse_arguments("openai", &call("[1, 2]")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedFunctionCall);
    }

    #[test]
    fn test_response_with_tool_calls_deserializes() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "get_weather", "arguments": "{}" }
                    }]
                }
            }]
        }))
        .unwrap();

        let message = &response.choices[0].message;
        assert!(message.function_call.is_none());
        assert_eq!(message.tool_calls.as_ref().unwrap()[0].function.name, "get_weather");
    }

    #[test]
    fn test_provider_ids() {
        let logger: SharedLogger = Arc::new(NoOpLogger::new());
        let compatible = OpenAiAdapter::compatible(
            ApiKey::new("k"),
            AdapterConfig::new("llama3").with_api_base("http://localhost:8000/v1"),
            logger,
        );
        assert_eq!(compatible.provider_name(), "openai-compatible");
        assert_eq!(compatible.base_url(), "http://localhost:8000/v1");
        assert_eq!(adapter().function_calling(), FunctionCalling::Native);
    }
}
