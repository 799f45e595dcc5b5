//! Gateway error types

use thiserror::Error;

/// Boxed underlying cause carried by a [`GatewayError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure class of a gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad, expired or revoked credential
    Authentication,
    /// Provider throttling
    RateLimited,
    /// Any other non-success wire response, or an unexpected response shape
    Provider,
    /// Network, connection or timeout failure
    Transport,
    /// A native function call whose arguments are not a JSON object
    MalformedFunctionCall,
    /// The caller cancelled the call through a `CancellationToken`
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::RateLimited => "rate-limited",
            ErrorKind::Provider => "provider-error",
            ErrorKind::Transport => "transport",
            ErrorKind::MalformedFunctionCall => "malformed-function-call",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error type surfaced by adapters
///
/// `message` names the failure class and may quote the provider's own error
/// text, but never the credential or the request payload. The original
/// error, when there is one, is kept as `cause` and exposed through
/// [`std::error::Error::source`].
#[derive(Error, Debug)]
#[error("{provider} {kind}: {message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    pub message: String,
    pub provider: String,
    #[source]
    pub cause: Option<BoxError>,
}

impl GatewayError {
    pub fn new(kind: ErrorKind, provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: provider.into(),
            cause: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, provider, message)
    }

    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, provider, message)
    }

    pub fn provider_error(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Provider, provider, message)
    }

    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, provider, message)
    }

    pub fn malformed_function_call(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedFunctionCall, provider, message)
    }

    pub fn cancelled(provider: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, provider, "request cancelled")
    }

    /// Whether a caller-side retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::RateLimited | ErrorKind::Transport)
    }
}

/// Wire status and provider-supplied error text, kept as a cause
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("HTTP {status}: {body}")]
pub struct WireStatus {
    pub status: u16,
    pub body: String,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_names_provider_and_kind() {
        let err = GatewayError::rate_limited("openai", "slow down");
        assert_eq!(err.to_string(), "openai rate-limited: slow down");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_cause_is_preserved() {
        let err = GatewayError::authentication("gemini", "invalid credential").with_cause(WireStatus {
            status: 401,
            body: "denied".to_string(),
        });

        let source = err.source().expect("cause should be exposed");
        let status = source.downcast_ref::<WireStatus>().expect("cause type should survive");
        assert_eq!(status.status, 401);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::Provider.as_str(), "provider-error");
        assert_eq!(ErrorKind::MalformedFunctionCall.to_string(), "malformed-function-call");
    }
}
