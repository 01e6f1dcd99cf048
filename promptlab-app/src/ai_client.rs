//! Chat Completion Client
//!
//! `ChatCompletionClient` is the seam between scenario generation and the
//! model provider. Every failure comes back as a `CompletionError` tagged with
//! its kind, so callers never need to inspect provider-specific error bodies.
//!
//! `OpenAIClient` talks to any OpenAI-compatible `/chat/completions` endpoint.

use async_trait::async_trait;
use promptlab_core::{ChatCompletion, ChatCompletionRequest};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionErrorKind {
    /// Transport failed before a response arrived
    Network,
    /// Provider answered with a non-success status
    Api,
    /// Response body was not a chat completion
    Parse,
}

impl CompletionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionErrorKind::Network => "network",
            CompletionErrorKind::Api => "api",
            CompletionErrorKind::Parse => "parse",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} error: {message}", .kind.as_str())]
pub struct CompletionError {
    pub kind: CompletionErrorKind,
    pub message: String,
}

impl CompletionError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: CompletionErrorKind::Network,
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self {
            kind: CompletionErrorKind::Api,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: CompletionErrorKind::Parse,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion, CompletionError>;
}

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, CompletionError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::network(e.to_string()))?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAIClient {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion, CompletionError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::network(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::api(api_error_message(status.as_u16(), &body)));
        }

        serde_json::from_str(&body).map_err(|e| CompletionError::parse(e.to_string()))
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Message from an `{"error": {"message": ...}}` body, or the raw body
fn api_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => format!("HTTP {}: {}", status, body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAIClient::new("test-key".to_string());
        assert_eq!(client.base_url(), "https://api.openai.com/v1");

        let local = OpenAIClient::new("test-key".to_string()).with_base_url("http://localhost:8080/v1/");
        assert_eq!(local.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn extracts_provider_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(401, body), "Incorrect API key provided");
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(api_error_message(502, "Bad Gateway"), "HTTP 502: Bad Gateway");
        assert_eq!(api_error_message(500, "  "), "HTTP 500");
    }

    #[test]
    fn error_display_includes_kind() {
        let err = CompletionError::parse("expected value at line 1");
        assert_eq!(err.kind, CompletionErrorKind::Parse);
        assert_eq!(err.to_string(), "parse error: expected value at line 1");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let client = OpenAIClient::new("test-key".to_string())
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .unwrap();
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo-0613".to_string(),
            messages: vec![],
            functions: vec![],
            function_call: promptlab_core::FunctionCallDirective {
                name: "add_scenario".to_string(),
            },
            temperature: 0.5,
        };

        let err = client.create_chat_completion(&request).await.unwrap_err();
        assert_eq!(err.kind, CompletionErrorKind::Network);
    }
}
