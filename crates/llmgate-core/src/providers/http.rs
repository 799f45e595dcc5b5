//! Shared HTTP plumbing for provider adapters
//!
//! Every adapter owns one [`LazyClient`] and funnels its wire calls through
//! [`send_json`] / [`check_credential`], so status classification and
//! credential scrubbing behave the same for all providers.

use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{Map, Value};

use crate::logging::SharedLogger;

use super::error::{ErrorKind, GatewayError, GatewayResult, WireStatus};
use super::traits::ApiKey;

/// Longest provider error text quoted in a `GatewayError`
const MAX_ERROR_TEXT: usize = 300;

/// A `reqwest::Client` created on first use and reused afterwards
///
/// Initialisation happens at most once even when the first calls race;
/// the pool is released when the owning adapter is dropped.
#[derive(Debug)]
pub struct LazyClient {
    cell: OnceCell<reqwest::Client>,
    timeout: Duration,
}

impl LazyClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            cell: OnceCell::new(),
            timeout,
        }
    }

    /// Get the client, building it if this is the first call
    pub fn get(&self, provider: &str) -> GatewayResult<&reqwest::Client> {
        self.cell.get_or_try_init(|| {
            reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| {
                    GatewayError::transport(provider, "failed to build HTTP client")
                        .with_cause(e.without_url())
                })
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Default status classification shared by all providers
pub fn classify_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Authentication,
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
        _ => ErrorKind::Provider,
    }
}

/// Replace every occurrence of the credential with `***`
pub fn redact(text: &str, api_key: &ApiKey) -> String {
    if api_key.is_empty() {
        text.to_string()
    } else {
        text.replace(api_key.expose(), "***")
    }
}

/// Pull a human-readable message out of a provider error body
///
/// OpenAI, Anthropic and Gemini all use `{"error": {"message": ...}}`;
/// anything else falls back to the raw body. The credential is scrubbed
/// before truncation so a key straddling the cut cannot survive as a prefix.
pub fn provider_message(body: &str, api_key: &ApiKey) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string());

    truncate(&redact(&message, api_key), MAX_ERROR_TEXT)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Map a `reqwest` failure to a transport error, dropping the URL so
/// query-parameter credentials cannot leak through `Display`
pub fn transport_error(provider: &str, err: reqwest::Error) -> GatewayError {
    let message = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    GatewayError::transport(provider, message).with_cause(err.without_url())
}

/// Build the error for a non-success response
pub fn status_error(
    provider: &str,
    api_key: &ApiKey,
    status: StatusCode,
    body: &str,
    kind: ErrorKind,
) -> GatewayError {
    let text = provider_message(body, api_key);
    GatewayError::new(kind, provider, format!("HTTP {}: {}", status.as_u16(), text)).with_cause(WireStatus {
        status: status.as_u16(),
        body: text,
    })
}

/// Send a request and decode a JSON success body
///
/// `classify` decides the error kind for non-success statuses; most
/// providers pass a closure around [`classify_status`].
pub async fn send_json<F>(
    provider: &str,
    api_key: &ApiKey,
    request: RequestBuilder,
    classify: F,
) -> GatewayResult<Value>
where
    F: Fn(StatusCode, &str) -> ErrorKind,
{
    let response = request.send().await.map_err(|e| transport_error(provider, e))?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(provider, api_key, status, &body, classify(status, &body)));
    }

    response.json::<Value>().await.map_err(|e| {
        if e.is_decode() {
            GatewayError::provider_error(provider, "response body is not valid JSON").with_cause(e.without_url())
        } else {
            transport_error(provider, e)
        }
    })
}

/// Run a credential probe and interpret its status
///
/// Authentication failures become `Ok(false)`; throttling means the key was
/// accepted, so it counts as valid. Only transport failures are errors.
pub async fn check_credential<F>(
    provider: &str,
    logger: &SharedLogger,
    request: RequestBuilder,
    classify: F,
) -> GatewayResult<bool>
where
    F: Fn(StatusCode, &str) -> ErrorKind,
{
    let response = request.send().await.map_err(|e| transport_error(provider, e))?;
    let status = response.status();

    if status.is_success() {
        return Ok(true);
    }

    let body = response.text().await.unwrap_or_default();
    match classify(status, &body) {
        ErrorKind::Authentication => Ok(false),
        ErrorKind::RateLimited => Ok(true),
        _ => {
            crate::log_warn!(
                logger,
                "[{}] credential probe returned unexpected status {}",
                provider,
                status.as_u16()
            );
            Ok(false)
        }
    }
}

/// Merge caller-supplied fields into the top level of a request body
pub fn merge_extra(body: &mut Value, extra: Option<&Map<String, Value>>) {
    if let (Value::Object(target), Some(extra)) = (body, extra) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), ErrorKind::Authentication);
        assert_eq!(classify_status(StatusCode::FORBIDDEN), ErrorKind::Authentication);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), ErrorKind::RateLimited);
        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), ErrorKind::Provider);
        assert_eq!(classify_status(StatusCode::BAD_REQUEST), ErrorKind::Provider);
    }

    #[test]
    fn test_provider_message_extraction() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let key = ApiKey::new("sk");
        assert_eq!(provider_message(body, &key), "Incorrect API key provided");

        assert_eq!(provider_message(r#"{"error": "bad gateway"}"#, &key), "bad gateway");
        assert_eq!(provider_message("  upstream timeout \n", &key), "upstream timeout");
    }

    #[test]
    fn test_provider_message_is_truncated() {
        let long = "x".repeat(1000);
        let message = provider_message(&long, &ApiKey::new("sk"));
        assert_eq!(message.chars().count(), MAX_ERROR_TEXT + 3);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_status_error_redacts_credential() {
        let key = ApiKey::new("sk-live-abcdef");
        let body = r#"{"error": {"message": "Incorrect API key provided: sk-live-abcdef"}}"#;
        let err = status_error("openai", &key, StatusCode::UNAUTHORIZED, body, ErrorKind::Authentication);

        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(!err.to_string().contains("sk-live-abcdef"));
        assert!(err.message.contains("***"));
        assert!(err.message.starts_with("HTTP 401"));
    }

    #[test]
    fn test_credential_at_truncation_boundary_is_redacted() {
        let key = ApiKey::new("sk-live-SECRETSECRET1234");
        let body = format!("{}{}", "x".repeat(290), key.expose());
        let err = status_error("openai", &key, StatusCode::UNAUTHORIZED, &body, ErrorKind::Authentication);

        assert!(!err.message.contains("sk-live-SE"));
        assert!(err.message.ends_with("***"));
        let cause = err.cause.as_ref().map(|c| c.to_string()).unwrap_or_default();
        assert!(!cause.contains("sk-live-SE"));
    }

    #[test]
    fn test_merge_extra() {
        let mut body = json!({ "model": "m", "temperature": 0.1 });
        let mut extra = Map::new();
        extra.insert("top_p".to_string(), json!(0.5));
        extra.insert("temperature".to_string(), json!(0.9));

        merge_extra(&mut body, Some(&extra));
        assert_eq!(body, json!({ "model": "m", "temperature": 0.9, "top_p": 0.5 }));

        merge_extra(&mut body, None);
        assert_eq!(body["top_p"], json!(0.5));
    }

    #[test]
    fn test_lazy_client_initialises_once() {
        let client = LazyClient::new(Duration::from_secs(5));
        assert!(!client.is_initialized());

        let addresses: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| client.get("test").unwrap() as *const reqwest::Client as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(client.is_initialized());
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }
}
