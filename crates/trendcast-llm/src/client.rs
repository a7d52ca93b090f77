//! HTTP client for an OpenAI-style chat-completions API.
//!
//! Wraps `reqwest` with API-key management, typed response deserialization,
//! and bounded retry. The base URL is injectable so tests can point at a
//! mock server.

use std::time::Duration;

use reqwest::{Client, Url};

use trendcast_core::AppConfig;

use crate::error::LlmError;
use crate::retry::retry_with_backoff;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ErrorEnvelope};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection settings for [`LlmClient`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl LlmConfig {
    /// Sensible defaults around a required API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4000,
            temperature: 0.7,
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }

    /// Build from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] if no key is configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, LlmError> {
        let api_key = config
            .llm_api_key
            .clone()
            .ok_or(LlmError::MissingApiKey)?;

        Ok(Self {
            api_key,
            base_url: config.llm_base_url.clone(),
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            timeout_secs: config.call_timeout_secs,
            max_retries: config.llm_max_retries,
            backoff_base_ms: config.llm_backoff_base_ms,
        })
    }
}

/// Client for an OpenAI-style chat-completions API.
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: Url,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl LlmClient {
    /// Creates a new client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] for an empty key,
    /// [`LlmError::InvalidBaseUrl`] for an unparseable base URL, or
    /// [`LlmError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("trendcast/0.1 (content-pipeline)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // join() appends the endpoint path instead of replacing the last
        // path segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| LlmError::InvalidBaseUrl(config.base_url.clone()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    /// Send one chat exchange and return the first choice's content.
    ///
    /// Retries transient failures per the back-off policy.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Api`] / [`LlmError::RateLimited`] for non-2xx statuses.
    /// - [`LlmError::Http`] on network failure.
    /// - [`LlmError::Deserialize`] if the response body does not match the
    ///   expected shape.
    /// - [`LlmError::EmptyResponse`] when a 2xx body carries no choices.
    pub(crate) async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f32>,
    ) -> Result<String, LlmError> {
        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|_| LlmError::InvalidBaseUrl(self.base_url.to_string()))?;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_chat(&url, messages, temperature)
        })
        .await
    }

    async fn send_chat(
        &self,
        url: &Url,
        messages: &[ChatMessage],
        temperature: Option<f32>,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: temperature.unwrap_or(self.temperature),
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "sending chat request");

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map_or_else(|_| truncate(&body, 200), |envelope| envelope.error.message);

            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited(message));
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: "chat/completions".to_string(),
                source: e,
            })?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(tokens = usage.total_tokens, "chat request complete");
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(base_url: &str) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            backoff_base_ms: 0,
            ..LlmConfig::new("test-key")
        }
    }

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"total_tokens": 42}
        })
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let config = LlmConfig::new("");
        assert!(matches!(
            LlmClient::new(&config),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = LlmConfig {
            base_url: "not a url".to_string(),
            ..LlmConfig::new("key")
        };
        assert!(matches!(
            LlmClient::new(&config),
            Err(LlmError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn chat_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("test-key"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("hello there")))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::new(&test_config(&server.uri())).expect("client builds");
        let reply = client
            .chat(&[ChatMessage::user("hi")], None)
            .await
            .expect("chat succeeds");

        assert_eq!(reply, "hello there");
    }

    #[tokio::test]
    async fn api_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "model not found"}
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(&test_config(&server.uri())).expect("client builds");
        let result = client.chat(&[ChatMessage::user("hi")], None).await;

        match result {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "model not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_errors_are_retried_then_succeed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("recovered")))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::new(&test_config(&server.uri())).expect("client builds");
        let reply = client
            .chat(&[ChatMessage::user("hi")], None)
            .await
            .expect("retries should recover");

        assert_eq!(reply, "recovered");
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "quota exhausted"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::new(&test_config(&server.uri())).expect("client builds");
        let result = client.chat(&[ChatMessage::user("hi")], None).await;

        assert!(matches!(result, Err(LlmError::RateLimited(_))));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = LlmClient::new(&test_config(&server.uri())).expect("client builds");
        let result = client.chat(&[ChatMessage::user("hi")], None).await;

        assert!(matches!(result, Err(LlmError::EmptyResponse)));
    }
}
