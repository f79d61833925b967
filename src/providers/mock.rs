/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock translation service that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with tagged text
 * - `MockProvider::failing_on(text)` - Fails the request for one specific text, without latency
 * - `MockProvider::empty()` - Answers without any translated text
 * - `.with_latency(..)` - Sleeps a random time per request to shuffle completion order
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Languages advertised by default, a slice of what real services offer
pub const DEFAULT_LANGUAGES: &[&str] = &["auto", "ar", "de", "en", "es", "fr", "it", "ja", "pt", "th"];

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[<target>] <text>`
    Working,
    /// Succeeds except for requests whose text equals the given one
    FailOnText(String),
    /// Always fails with an error
    Failing,
    /// Answers without translated text
    Empty,
}

/// Shared counters observable from tests
#[derive(Debug, Default)]
pub struct MockStats {
    /// Requests started
    pub started: AtomicUsize,
    /// Requests that returned, with or without an error
    pub finished: AtomicUsize,
    /// Requests currently running
    pub in_flight: AtomicUsize,
    /// Highest `in_flight` value ever observed
    pub max_in_flight: AtomicUsize,
    /// `list_languages` calls
    pub language_listings: AtomicUsize,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    languages: Vec<String>,
    /// Inclusive latency range per request in ms
    latency_ms: Option<(u64, u64)>,
    stats: Arc<MockStats>,
    /// Texts received, in arrival order
    received: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            latency_ms: None,
            stats: Arc::new(MockStats::default()),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fails for one specific cue text
    pub fn failing_on(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailOnText(text.into()))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns no translated text
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Replace the advertised language list
    pub fn with_languages(mut self, languages: &[&str]) -> Self {
        self.languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Sleep a random duration in `min_ms..=max_ms` before answering
    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency_ms = Some((min_ms, max_ms.max(min_ms)));
        self
    }

    /// Counters shared by every clone of this provider
    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    /// Texts received so far, in arrival order
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Text the working behavior produces for `text`
    pub fn expected_translation(target_language: &str, text: &str) -> String {
        format!("[{}] {}", target_language, text)
    }
}

/// Keeps the in-flight counter right even when the request future is dropped
struct InFlightGuard<'a>(&'a MockStats);

impl<'a> InFlightGuard<'a> {
    fn enter(stats: &'a MockStats) -> Self {
        stats.started.fetch_add(1, Ordering::SeqCst);
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(stats)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn list_languages(&self) -> Result<Vec<String>, ProviderError> {
        self.stats.language_listings.fetch_add(1, Ordering::SeqCst);
        if self.behavior == MockBehavior::Failing {
            return Err(ProviderError::ConnectionError("Simulated connection failure".to_string()));
        }
        Ok(self.languages.clone())
    }

    async fn translate_text(
        &self,
        _source_language: &str,
        target_language: &str,
        text: &str,
    ) -> Result<Option<String>, ProviderError> {
        let _guard = InFlightGuard::enter(&self.stats);
        self.received.lock().push(text.to_string());

        // Failures answer right away, only successes pay the latency
        let failure = match &self.behavior {
            MockBehavior::FailOnText(failing) if failing == text => Some(format!("Simulated failure for '{}'", text)),
            MockBehavior::Failing => Some("Simulated provider failure".to_string()),
            _ => None,
        };
        if let Some(message) = failure {
            self.stats.finished.fetch_add(1, Ordering::SeqCst);
            return Err(ProviderError::ApiError { status_code: 500, message });
        }

        if let Some((min_ms, max_ms)) = self.latency_ms {
            let delay = rand::rng().random_range(min_ms..=max_ms);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.stats.finished.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Empty => Ok(None),
            _ => Ok(Some(Self::expected_translation(target_language, text))),
        }
    }
}
