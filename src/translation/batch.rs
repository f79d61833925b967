/*!
 * Batch translation processing.
 *
 * Every cue of a track becomes one request to the translation service. At most
 * `max_concurrent_requests` of them run at a time, they may finish in any
 * order, and the result is always assembled in original cue order.
 */

use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, error, info};
use tokio::sync::Semaphore;

use crate::errors::{ProviderError, TranslationError};
use crate::subtitle_processor::{Cue, SubtitleEntry};

use super::core::{TranslationService, TranslationStats};

/// Progress callback, called with `(completed, total)` after each finished request
pub type ProgressFn<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

/// Batch translator for turning a track's cues into translated entries
pub struct BatchTranslator {
    /// The translation service to use
    service: TranslationService,

    /// Maximum number of concurrent requests
    max_concurrent_requests: usize,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(service: TranslationService) -> Self {
        Self {
            max_concurrent_requests: service.options.max_concurrent_requests.max(1),
            service,
        }
    }

    /// Number of requests allowed in flight at once
    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    /// Translate every cue, returning one entry per cue numbered from 1 in cue order.
    ///
    /// The first failed request fails the whole call. Requests still running or
    /// waiting for a permit at that point are dropped and never complete.
    pub async fn translate_cues(
        &self,
        cues: &[Cue],
        source_language: &str,
        target_language: &str,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        let total = cues.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        let semaphore = Semaphore::new(self.max_concurrent_requests);
        let semaphore = &semaphore;
        let service = &self.service;

        // One slot per cue, sized up front
        let mut slots: Vec<Option<SubtitleEntry>> = vec![None; total];

        let mut pending: FuturesUnordered<_> = cues
            .iter()
            .enumerate()
            .map(|(slot, cue)| async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

                let text = service
                    .translate_text(source_language, target_language, &cue.text)
                    .await
                    .inspect_err(|e| error!("Cue {} failed to translate: {}", slot + 1, e))?;

                Ok::<_, TranslationError>((slot, SubtitleEntry::from_cue(slot + 1, cue, text)))
            })
            .collect();

        let mut completed = 0;
        while let Some(result) = pending.next().await {
            let (slot, entry) = result?;
            debug!("Cue {} translated", entry.seq_num);
            slots[slot] = Some(entry);

            completed += 1;
            if let Some(on_progress) = on_progress {
                on_progress(completed, total);
            }
        }

        let stats = TranslationStats {
            requests: total,
            elapsed: start_time.elapsed(),
        };
        info!(
            "Translated {} cues from '{}' to '{}': {}",
            total,
            source_language,
            target_language,
            stats.summary()
        );

        // Every slot is filled once the stream is drained without error
        Ok(slots.into_iter().flatten().collect())
    }
}
