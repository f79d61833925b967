/*!
 * Provider implementations for remote translation services.
 *
 * This module contains client implementations for the services cues are sent to:
 * - LibreTranslate: self-hosted or public LibreTranslate-compatible HTTP API
 * - Mock: in-process double used by the test suite
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// Retries and timeouts are the provider's business; callers treat any error
/// coming out of these methods as final.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// List the two-letter language codes the service accepts
    async fn list_languages(&self) -> Result<Vec<String>, ProviderError>;

    /// Translate a single piece of text
    ///
    /// # Returns
    /// * `Ok(None)` - The service answered without any translated text
    async fn translate_text(
        &self,
        source_language: &str,
        target_language: &str,
        text: &str,
    ) -> Result<Option<String>, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.list_languages().await.map(|_| ())
    }
}

pub mod libretranslate;
pub mod mock;
