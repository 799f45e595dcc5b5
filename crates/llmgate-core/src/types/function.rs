//! Function calling types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declares a capability the model may invoke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name, unique within one request
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the arguments object, passed to providers verbatim
    pub parameters: Value,
}

impl FunctionDefinition {
    /// Create a function definition that takes no arguments
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Set the parameters schema
    pub fn with_parameters(mut self, schema: Value) -> Self {
        self.parameters = schema;
        self
    }
}

/// The model's request to invoke a named function
///
/// `arguments` is always a JSON object. Whether it satisfies the matching
/// definition's schema is for the caller to decide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function being called
    pub name: String,
    /// Arguments for the function
    pub arguments: Map<String, Value>,
}

impl FunctionCall {
    /// Create a new function call
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }

    /// Get an argument as a string
    pub fn get_arg_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get an argument as an i64
    pub fn get_arg_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// Arguments serialized as a JSON string, the shape native wires expect
    pub fn arguments_json(&self) -> String {
        Value::Object(self.arguments.clone()).to_string()
    }
}

/// Result of a function-enabled completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Completion {
    /// Ordinary natural-language answer
    Text { text: String },
    /// Structured invocation request
    FunctionCall { call: FunctionCall },
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Completion::Text { text: text.into() }
    }

    pub fn call(call: FunctionCall) -> Self {
        Completion::FunctionCall { call }
    }

    /// The text answer, if this is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Completion::Text { text } => Some(text),
            Completion::FunctionCall { .. } => None,
        }
    }

    /// The function call, if this is one
    pub fn as_call(&self) -> Option<&FunctionCall> {
        match self {
            Completion::Text { .. } => None,
            Completion::FunctionCall { call } => Some(call),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_definition_creation() {
        let def = FunctionDefinition::new("get_weather", "Get the current weather")
            .with_parameters(json!({
                "type": "object",
                "properties": {
                    "city": { "type": "string" }
                },
                "required": ["city"]
            }));

        assert_eq!(def.name, "get_weather");
        assert_eq!(def.parameters["required"][0], "city");
    }

    #[test]
    fn test_call_args() {
        let call = FunctionCall::new(
            "get_weather",
            args(json!({
                "city": "San Francisco",
                "days": 3
            })),
        );

        assert_eq!(call.get_arg_str("city"), Some("San Francisco"));
        assert_eq!(call.get_arg_i64("days"), Some(3));
        assert_eq!(call.get_arg_str("nonexistent"), None);
    }

    #[test]
    fn test_arguments_json_round_trips() {
        let call = FunctionCall::new("f", args(json!({ "nested": { "a": [1, 2] } })));
        let parsed: Value = serde_json::from_str(&call.arguments_json()).unwrap();
        assert_eq!(parsed, json!({ "nested": { "a": [1, 2] } }));
    }

    #[test]
    fn test_completion_accessors() {
        let text = Completion::text("Hi");
        assert_eq!(text.as_text(), Some("Hi"));
        assert!(text.as_call().is_none());

        let call = Completion::call(FunctionCall::new("f", Map::new()));
        assert_eq!(call.as_call().map(|c| c.name.as_str()), Some("f"));
    }
}
