//! HTTP utilities for control-plane REST calls

use crate::error::ClientError;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Maximum length of a server message carried into an error
const MAX_ERROR_MESSAGE_LENGTH: usize = 160;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = floor_char_boundary(body, MAX_LOG_BODY_LENGTH);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Raw response: status plus body text
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    /// Best-effort server message: `message` or `error.message` from a JSON
    /// body, else the sanitized body
    pub fn message(&self) -> String {
        let from_json = serde_json::from_str::<Value>(&self.body).ok().and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error").and_then(|e| e.get("message")))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

        let message = from_json.unwrap_or_else(|| sanitize_for_log(&self.body));
        if message.is_empty() {
            return self
                .status
                .canonical_reason()
                .unwrap_or("no message")
                .to_string();
        }

        let cut = floor_char_boundary(&message, MAX_ERROR_MESSAGE_LENGTH.min(message.len()));
        message[..cut].to_string()
    }
}

/// HTTP client wrapper for control-plane API calls
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP client
    pub fn new(token: Option<String>, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder().user_agent(concat!("netctl/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Connection(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, token })
    }

    /// Send a request and return the response, successful or not
    ///
    /// Only transport failures are errors here; status handling is left to the
    /// caller, which knows what a 404 or 409 means for the call it made.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<HttpResponse, ClientError> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Connection(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::warn!("API error: {} {} - {}", method, status, sanitize_for_log(&body));
        }

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let out = sanitize_for_log(&body);
        assert!(out.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(out.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc"), "abc");
    }

    #[test]
    fn test_message_prefers_json_fields() {
        let response = HttpResponse {
            status: StatusCode::CONFLICT,
            body: r#"{"error":{"code":409,"message":"stale revision"}}"#.to_string(),
        };
        assert_eq!(response.message(), "stale revision");

        let response = HttpResponse {
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert_eq!(response.message(), "Not Found");
    }
}
