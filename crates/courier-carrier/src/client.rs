// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the carrier's REST delivery API.
//!
//! Authenticates with the relay's own service credentials (HTTP basic auth
//! with account SID and token), never the user's. Credentials are injected
//! at construction, so there is no hidden module-level cache.

use std::time::Duration;

use async_trait::async_trait;
use courier_config::model::CarrierConfig;
use courier_core::types::{AdapterType, HealthStatus};
use courier_core::{CarrierClient, CourierError, PluginAdapter};
use serde::Deserialize;
use tracing::debug;

/// Successful send response body.
#[derive(Debug, Deserialize)]
struct SendResponse {
    sid: String,
}

/// Error response body from the carrier API.
#[derive(Debug, Deserialize)]
struct CarrierErrorBody {
    message: String,
}

/// Carrier REST client for WhatsApp delivery via a Twilio-style API.
#[derive(Debug, Clone)]
pub struct CarrierHttpClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
}

impl CarrierHttpClient {
    /// Creates a client from carrier configuration.
    ///
    /// Fails when credentials or the relay's WhatsApp number are missing;
    /// the caller decides whether outbound delivery is required.
    pub fn new(config: &CarrierConfig) -> Result<Self, CourierError> {
        let account_sid = config
            .account_sid
            .clone()
            .ok_or_else(|| CourierError::Config("carrier.account_sid is not set".into()))?;
        let auth_token = config
            .auth_token
            .clone()
            .ok_or_else(|| CourierError::Config("carrier.auth_token is not set".into()))?;
        let from_number = config
            .whatsapp_number
            .clone()
            .ok_or_else(|| CourierError::Config("carrier.whatsapp_number is not set".into()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CourierError::Carrier {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            account_sid,
            auth_token,
            from_number,
            base_url: config.base_url.clone(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    /// Prefix a normalized digit identity with the WhatsApp address scheme.
    fn whatsapp_addr(number: &str) -> String {
        let digits = number.trim_start_matches('+');
        format!("whatsapp:+{digits}")
    }
}

#[async_trait]
impl PluginAdapter for CarrierHttpClient {
    fn name(&self) -> &str {
        "twilio-whatsapp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Carrier
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl CarrierClient for CarrierHttpClient {
    async fn send_message(&self, to: &str, body: &str) -> Result<String, CourierError> {
        let form = [
            ("From", Self::whatsapp_addr(&self.from_number)),
            ("To", Self::whatsapp_addr(to)),
            ("Body", body.to_string()),
        ];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| CourierError::Carrier {
                message: format!("send request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status.is_success() {
            let body: SendResponse =
                response.json().await.map_err(|e| CourierError::Carrier {
                    message: format!("malformed send response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            debug!(sid = %body.sid, "carrier accepted message");
            return Ok(body.sid);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<CarrierErrorBody>(&text)
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("carrier returned {status}: {text}"));
        Err(CourierError::Carrier {
            message,
            source: None,
        })
    }

    async fn send_typing(&self, to: &str) -> Result<(), CourierError> {
        let form = [("To", Self::whatsapp_addr(to))];
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Typing.json",
            self.base_url, self.account_sid
        );

        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| CourierError::Carrier {
                message: format!("typing indicator request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(CourierError::Carrier {
                message: format!("typing indicator returned {}", response.status()),
                source: None,
            });
        }
        Ok(())
    }

    async fn download_media(&self, url: &str) -> Result<(Vec<u8>, String), CourierError> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| CourierError::Carrier {
                message: format!("media download request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CourierError::Carrier {
                message: format!("media download returned {status}"),
                source: None,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response.bytes().await.map_err(|e| CourierError::Carrier {
            message: format!("media download body read failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        debug!(size = bytes.len(), content_type = %content_type, "downloaded carrier media");
        Ok((bytes.to_vec(), content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> CarrierConfig {
        CarrierConfig {
            account_sid: Some("AC123".to_string()),
            auth_token: Some("secret".to_string()),
            whatsapp_number: Some("14155238886".to_string()),
            sandbox_join_words: None,
            base_url: "https://api.twilio.com".to_string(),
        }
    }

    #[test]
    fn new_requires_credentials() {
        let mut config = test_config();
        config.auth_token = None;
        assert!(CarrierHttpClient::new(&config).is_err());
    }

    #[test]
    fn whatsapp_addr_prefixes_scheme_and_plus() {
        assert_eq!(
            CarrierHttpClient::whatsapp_addr("15551234567"),
            "whatsapp:+15551234567"
        );
        assert_eq!(
            CarrierHttpClient::whatsapp_addr("+15551234567"),
            "whatsapp:+15551234567"
        );
    }

    #[tokio::test]
    async fn send_message_returns_sid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(body_string_contains("To=whatsapp%3A%2B15551234567"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "SM900",
                "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CarrierHttpClient::new(&test_config())
            .unwrap()
            .with_base_url(server.uri());
        let sid = client.send_message("15551234567", "hello").await.unwrap();
        assert_eq!(sid, "SM900");
    }

    #[tokio::test]
    async fn send_message_surfaces_carrier_error_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number."
            })))
            .mount(&server)
            .await;

        let client = CarrierHttpClient::new(&test_config())
            .unwrap()
            .with_base_url(server.uri());
        let err = client.send_message("bogus", "hello").await.unwrap_err();
        assert!(err.to_string().contains("not a valid phone number"));
    }

    #[tokio::test]
    async fn download_media_returns_bytes_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/ME1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0xFF, 0xD8, 0xFF]),
            )
            .mount(&server)
            .await;

        let client = CarrierHttpClient::new(&test_config())
            .unwrap()
            .with_base_url(server.uri());
        let (bytes, content_type) = client
            .download_media(&format!("{}/media/ME1", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn typing_indicator_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = CarrierHttpClient::new(&test_config())
            .unwrap()
            .with_base_url(server.uri());
        assert!(client.send_typing("15551234567").await.is_err());
    }
}
