//! Chat message types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::function::FunctionCall;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    /// Output of a function the caller executed on the model's behalf
    Function,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Function => write!(f, "function"),
        }
    }
}

/// Errors raised when a message violates its construction rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("function messages require a non-empty name")]
    MissingFunctionName,

    #[error("only assistant messages may carry a function call (got {0})")]
    UnexpectedFunctionCall(MessageRole),
}

/// One turn in a conversation
///
/// Messages are immutable once built. Use the role constructors; the
/// fallible ones enforce that a `Function` message names the function that
/// produced it and that only `Assistant` messages carry a function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    role: MessageRole,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::Assistant, content)
    }

    /// Create an assistant turn that records a function invocation
    pub fn assistant_call(call: FunctionCall) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: String::new(),
            name: None,
            function_call: Some(call),
        }
    }

    /// Create a function-result message
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Result<Self, MessageError> {
        Self::try_new(MessageRole::Function, content, Some(name.into()), None)
    }

    /// Create a message from its parts, validating role-specific rules
    pub fn try_new(
        role: MessageRole,
        content: impl Into<String>,
        name: Option<String>,
        function_call: Option<FunctionCall>,
    ) -> Result<Self, MessageError> {
        if role == MessageRole::Function && name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(MessageError::MissingFunctionName);
        }
        if function_call.is_some() && role != MessageRole::Assistant {
            return Err(MessageError::UnexpectedFunctionCall(role));
        }

        Ok(Self {
            role,
            content: content.into(),
            name,
            function_call,
        })
    }

    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            function_call: None,
        }
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Name of the function that produced this turn (`Function` role only)
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The invocation this assistant turn represents, if any
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.function_call.as_ref()
    }
}

#[derive(Deserialize)]
struct RawMessage {
    role: MessageRole,
    #[serde(default)]
    content: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "functionCall", default)]
    function_call: Option<FunctionCall>,
}

impl TryFrom<RawMessage> for Message {
    type Error = MessageError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        Message::try_new(raw.role, raw.content, raw.name, raw.function_call)
    }
}
