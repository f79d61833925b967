/*!
 * Core translation service implementation.
 *
 * `TranslationService` owns the provider handle shared by the language
 * validator and the cue pipeline, together with the pipeline options.
 */

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::app_config::TranslationConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::Provider;
use crate::providers::libretranslate::LibreTranslate;

/// Translation options for customizing the translation process
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Maximum number of requests in flight at once
    pub max_concurrent_requests: usize,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 5,
        }
    }
}

/// Timing statistics for one translation run
#[derive(Debug, Clone)]
pub struct TranslationStats {
    /// Number of requests sent
    pub requests: usize,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl TranslationStats {
    /// Requests completed per second of wall time
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.requests as f64 / secs
        } else {
            0.0
        }
    }

    /// Generate a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} requests in {:.2}s ({:.1} req/s)",
            self.requests,
            self.elapsed.as_secs_f64(),
            self.requests_per_second()
        )
    }
}

/// Translation service handle, cheap to clone
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Remote translation provider
    provider: Arc<dyn Provider>,

    /// Options for the pipeline
    pub options: TranslationOptions,
}

impl TranslationService {
    /// Create a service backed by the LibreTranslate client described by `config`
    pub fn new(config: &TranslationConfig) -> Result<Self, ProviderError> {
        let provider = LibreTranslate::from_config(config)?;
        Ok(Self::with_provider(
            Arc::new(provider),
            TranslationOptions {
                max_concurrent_requests: config.concurrent_requests,
            },
        ))
    }

    /// Create a service around an existing provider
    pub fn with_provider(provider: Arc<dyn Provider>, options: TranslationOptions) -> Self {
        Self { provider, options }
    }

    /// The underlying provider
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Check that every requested language is offered by the service.
    ///
    /// The supported list is fetched once per call. The first code missing
    /// from it fails with `InvalidLanguage`.
    pub async fn validate_languages(&self, languages: &[&str]) -> Result<(), TranslationError> {
        let supported: HashSet<String> = self.provider.list_languages().await?.into_iter().collect();

        for language in languages {
            if !supported.contains(*language) {
                return Err(TranslationError::InvalidLanguage(language.to_string()));
            }
        }

        debug!("Languages accepted by the translation service: {:?}", languages);
        Ok(())
    }

    /// Translate a single text, mapping a missing answer to an empty string
    pub async fn translate_text(
        &self,
        source_language: &str,
        target_language: &str,
        text: &str,
    ) -> Result<String, TranslationError> {
        let translated = self
            .provider
            .translate_text(source_language, target_language, text)
            .await?;

        Ok(translated.unwrap_or_default())
    }

    /// Test the connection to the translation service
    pub async fn test_connection(&self) -> Result<Duration, TranslationError> {
        let start = Instant::now();
        self.provider.test_connection().await?;
        Ok(start.elapsed())
    }
}
