use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::{Client, StatusCode};
use url::Url;
use log::{debug, warn};

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::providers::Provider;

/// Longest pause between two attempts
const MAX_BACKOFF_MS: u64 = 30_000;

/// Client for a LibreTranslate-compatible translation API
///
/// Every call is retried with exponential backoff on connection failures,
/// HTTP 429 and 5xx answers, up to `max_attempts` attempts in total.
pub struct LibreTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Base URL of the service, always ending in `/`
    base_url: Url,
    /// Optional API key, sent with every request when non-empty
    api_key: String,
    /// Total attempts per call, first try included
    max_attempts: u32,
    /// Base backoff time in milliseconds, doubled after every failed attempt
    backoff_base_ms: u64,
}

impl std::fmt::Debug for LibreTranslate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibreTranslate")
            .field("base_url", &self.base_url.as_str())
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

/// Request body for `POST /translate`
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    /// Text to translate
    q: &'a str,
    /// Source language code
    source: &'a str,
    /// Target language code
    target: &'a str,
    /// Input format, subtitles are always plain text
    format: &'static str,
    /// API key for authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// Response body of `POST /translate`
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    /// The translated text, missing on some error-free empty answers
    #[serde(rename = "translatedText", default)]
    pub translated_text: Option<String>,
}

/// One element of the `GET /languages` response
#[derive(Debug, Deserialize)]
pub struct SupportedLanguage {
    /// Two-letter language code
    pub code: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl LibreTranslate {
    /// Create a new client
    pub fn new_with_config(
        endpoint: &str,
        api_key: impl Into<String>,
        max_attempts: u32,
        backoff_base_ms: u64,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut base_url = Url::parse(endpoint)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            max_attempts: max_attempts.max(1),
            backoff_base_ms,
        })
    }

    /// Create a client from the translation section of the config
    pub fn from_config(config: &TranslationConfig) -> Result<Self, ProviderError> {
        Self::new_with_config(
            &config.endpoint,
            config.api_key.clone(),
            config.max_attempts,
            config.retry_backoff_ms,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Absolute URL of an API route
    pub fn route(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid route '{}': {}", path, e)))
    }

    fn api_key(&self) -> Option<&str> {
        (!self.api_key.is_empty()).then_some(self.api_key.as_str())
    }

    /// Delay before attempt `attempt + 1`, where `attempt` counts from 1
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
    }

    /// Map a non-success HTTP answer to a provider error
    pub fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            },
        }
    }

    /// Send a request built by `build`, retrying transient failures
    async fn send_with_retry<T, F>(&self, operation: &str, build: F) -> Result<T, ProviderError>
    where
        T: serde::de::DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        response
                            .json::<T>()
                            .await
                            .map_err(|e| ProviderError::ParseError(e.to_string()))
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        Err(Self::error_for_status(status, &body))
                    }
                }
                Err(e) if e.is_connect() || e.is_timeout() => Err(ProviderError::ConnectionError(e.to_string())),
                Err(e) => Err(ProviderError::RequestFailed(e.to_string())),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        "{} failed: {} - attempt {}/{}, retrying in {:?}",
                        operation, e, attempt, self.max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    async fn list_languages(&self) -> Result<Vec<String>, ProviderError> {
        let url = self.route("languages")?;
        let languages: Vec<SupportedLanguage> = self
            .send_with_retry("List languages", || self.client.get(url.clone()))
            .await?;

        debug!("Translation service supports {} languages", languages.len());
        Ok(languages.into_iter().map(|l| l.code).collect())
    }

    async fn translate_text(
        &self,
        source_language: &str,
        target_language: &str,
        text: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = self.route("translate")?;
        let request = TranslateRequest {
            q: text,
            source: source_language,
            target: target_language,
            format: "text",
            api_key: self.api_key(),
        };

        let response: TranslateResponse = self
            .send_with_retry("Translate", || self.client.post(url.clone()).json(&request))
            .await?;

        Ok(response.translated_text)
    }
}
