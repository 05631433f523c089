//! HTTP email provider.
//!
//! Posts `{to, subject, htmlContent}` to the application's email endpoint and
//! reads back `{success, messageId}` or `{success: false, error}`.

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_parse_or, env_required};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Full URL of the send endpoint.
    pub api_url: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpTransportConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for HttpTransportConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = env_parse_or("EMAIL_API_TIMEOUT_SECS", 10)?;
        Ok(Self {
            api_url: env_required("EMAIL_API_URL")?,
            api_key: env_optional("EMAIL_API_KEY"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    to: &'a str,
    subject: &'a str,
    html_content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Email provider backed by the application's HTTP send endpoint.
pub struct HttpEmailProvider {
    config: HttpTransportConfig,
    client: Client,
}

impl HttpEmailProvider {
    /// Create a new HTTP provider.
    pub fn new(config: HttpTransportConfig) -> NotificationResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Create a provider from environment variables.
    pub fn from_env() -> NotificationResult<Self> {
        Self::new(HttpTransportConfig::from_env()?)
    }
}

#[async_trait]
impl EmailProvider for HttpEmailProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        let request = SendRequest {
            to: &email.to_email,
            subject: &email.subject,
            html_content: &email.html_body,
        };

        debug!(
            to = %email.to_email,
            subject = %email.subject,
            endpoint = %self.config.api_url,
            "Sending email via HTTP"
        );

        let mut builder = self.client.post(&self.config.api_url).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotificationError::ProviderError(format!("Failed to read response body: {}", e)))?;
        let parsed = serde_json::from_str::<SendResponse>(&body).ok();

        match parsed {
            Some(reply) if status.is_success() && reply.success => {
                info!(
                    to = %email.to_email,
                    message_id = ?reply.message_id,
                    "Email sent successfully via HTTP"
                );
                Ok(SentEmail {
                    message_id: reply.message_id,
                })
            }
            Some(SendResponse {
                error: Some(reason), ..
            }) => {
                error!(to = %email.to_email, status = %status, error = %reason, "Email rejected by HTTP endpoint");
                Err(NotificationError::ProviderError(reason))
            }
            _ => {
                error!(to = %email.to_email, status = %status, body = %body, "Failed to send email via HTTP");
                let reason = if status.is_success() {
                    "Email endpoint reported failure without a reason".to_string()
                } else {
                    format!("HTTP {}: {}", status, body)
                };
                Err(NotificationError::ProviderError(reason))
            }
        }
    }

    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn health_check(&self) -> NotificationResult<bool> {
        reqwest::Url::parse(&self.config.api_url).map_err(|e| {
            NotificationError::ConfigError(format!("Invalid EMAIL_API_URL '{}': {}", self.config.api_url, e))
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email() -> EmailContent {
        EmailContent {
            to_email: "p@x.com".to_string(),
            to_name: "Pat".to_string(),
            subject: "New Invoice INV-1".to_string(),
            html_body: "<p>$100.00</p>".to_string(),
        }
    }

    async fn provider_for(server: &MockServer) -> HttpEmailProvider {
        HttpEmailProvider::new(HttpTransportConfig::new(format!("{}/send-email", server.uri())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_payload_and_returns_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send-email"))
            .and(body_json(json!({
                "to": "p@x.com",
                "subject": "New Invoice INV-1",
                "htmlContent": "<p>$100.00</p>"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "messageId": "msg-42"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sent = provider_for(&server).await.send(&email()).await.unwrap();

        assert_eq!(sent.message_id.as_deref(), Some("msg-42"));
    }

    #[tokio::test]
    async fn test_send_surfaces_endpoint_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "error": "quota exceeded"})),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).await.send(&email()).await.unwrap_err();

        assert!(matches!(err, NotificationError::ProviderError(_)));
        assert_eq!(err.delivery_reason(), "quota exceeded");
    }

    #[tokio::test]
    async fn test_send_reports_http_status_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.send(&email()).await.unwrap_err();

        let reason = err.delivery_reason();
        assert!(reason.contains("503"), "{reason}");
        assert!(reason.contains("unavailable"), "{reason}");
    }

    #[tokio::test]
    async fn test_send_reports_truncated_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            // Promise more bytes than are sent, then close
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"succ")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let provider = HttpEmailProvider::new(HttpTransportConfig::new(format!("http://{}/send-email", addr))).unwrap();
        let err = provider.send(&email()).await.unwrap_err();

        let reason = err.delivery_reason();
        assert!(reason.starts_with("Failed to read response body"), "{reason}");
    }

    #[tokio::test]
    async fn test_send_uses_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let config = HttpTransportConfig::new(format!("{}/send-email", server.uri()))
            .with_api_key("secret-token");
        let sent = HttpEmailProvider::new(config).unwrap().send(&email()).await.unwrap();

        assert!(sent.message_id.is_none());
    }

    #[tokio::test]
    async fn test_health_check_rejects_bad_url() {
        let provider = HttpEmailProvider::new(HttpTransportConfig::new("not a url")).unwrap();
        assert!(provider.health_check().await.is_err());
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("EMAIL_API_URL", Some("https://daycare.test/api/send-email")),
                ("EMAIL_API_KEY", Some("k")),
                ("EMAIL_API_TIMEOUT_SECS", Some("3")),
            ],
            || {
                let config = HttpTransportConfig::from_env().unwrap();
                assert_eq!(config.api_url, "https://daycare.test/api/send-email");
                assert_eq!(config.api_key.as_deref(), Some("k"));
                assert_eq!(config.timeout, Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn test_config_requires_url() {
        temp_env::with_var_unset("EMAIL_API_URL", || {
            assert!(HttpTransportConfig::from_env().is_err());
        });
    }
}
