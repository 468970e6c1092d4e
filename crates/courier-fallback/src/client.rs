// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat-completions API.
//!
//! Handles request construction, bearer authentication, and transient
//! error retry. The responder above this client decides what to do when a
//! call ultimately fails; this client only reports.

use std::time::Duration;

use async_trait::async_trait;
use courier_config::model::FallbackConfig;
use courier_core::types::{AdapterType, CompletionRequest, HealthStatus};
use courier_core::{CompletionClient, CourierError, PluginAdapter};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatCompletionResponse, to_wire};

/// HTTP client for the fallback completion model.
///
/// Retries once after a 1-second delay on transient statuses (429, 500,
/// 503); all other failures surface immediately.
#[derive(Debug, Clone)]
pub struct CompletionHttpClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_retries: u32,
}

impl CompletionHttpClient {
    /// Creates a client from fallback configuration.
    pub fn new(config: &FallbackConfig) -> Result<Self, CourierError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| CourierError::Config("fallback.api_key is not set".into()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CourierError::Model {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            max_retries: 1,
        })
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[async_trait]
impl PluginAdapter for CompletionHttpClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionClient for CompletionHttpClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CourierError> {
        let wire = to_wire(&self.model, &request);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .http
                .post(self.completions_url())
                .bearer_auth(&self.api_key)
                .json(&wire)
                .send()
                .await
                .map_err(|e| CourierError::Model {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body: ChatCompletionResponse =
                    response.json().await.map_err(|e| CourierError::Model {
                        message: format!("malformed completion response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                let content = body
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .unwrap_or_default();
                if content.trim().is_empty() {
                    return Err(CourierError::Model {
                        message: "completion returned no content".into(),
                        source: None,
                    });
                }
                return Ok(content);
            }

            if is_transient(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(CourierError::Model {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "completion API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(CourierError::Model {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| CourierError::Model {
            message: "completion request failed after retries".into(),
            source: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::types::ChatTurn;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> FallbackConfig {
        FallbackConfig {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o".to_string(),
            max_tokens: 400,
            base_url: "https://api.openai.com".to_string(),
        }
    }

    fn simple_request() -> CompletionRequest {
        CompletionRequest {
            system: "be brief".to_string(),
            turns: vec![ChatTurn::text("user", "hi")],
            max_tokens: 400,
        }
    }

    #[test]
    fn new_requires_api_key() {
        let mut config = test_config();
        config.api_key = None;
        assert!(CompletionHttpClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn complete_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "hello!"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CompletionHttpClient::new(&test_config())
            .unwrap()
            .with_base_url(server.uri());
        let text = client.complete(simple_request()).await.unwrap();
        assert_eq!(text, "hello!");
    }

    #[tokio::test]
    async fn transient_error_retries_once_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "recovered"}}]
            })))
            .mount(&server)
            .await;

        let client = CompletionHttpClient::new(&test_config())
            .unwrap()
            .with_base_url(server.uri());
        let text = client.complete(simple_request()).await.unwrap();
        assert_eq!(text, "recovered");
    }

    #[tokio::test]
    async fn non_transient_error_surfaces_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "invalid api key", "type": "auth_error"}
            })))
            .mount(&server)
            .await;

        let client = CompletionHttpClient::new(&test_config())
            .unwrap()
            .with_base_url(server.uri());
        let err = client.complete(simple_request()).await.unwrap_err();
        assert!(err.to_string().contains("invalid api key"));
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "  "}}]
            })))
            .mount(&server)
            .await;

        let client = CompletionHttpClient::new(&test_config())
            .unwrap()
            .with_base_url(server.uri());
        assert!(client.complete(simple_request()).await.is_err());
    }
}
