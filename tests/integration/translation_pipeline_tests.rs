/*!
 * Integration tests for the language validator and the cue translation pipeline
 */

use parking_lot::Mutex;
use std::sync::atomic::Ordering;
use std::time::Duration;

use subtranslate::errors::{ProviderError, TranslationError};
use subtranslate::providers::mock::MockProvider;
use subtranslate::subtitle_processor::render_srt;
use subtranslate::translation::BatchTranslator;

use crate::common::{make_cues, mock_service};

/// Every limit from 1 to N yields entries 1..N in cue order, whatever the completion order
#[tokio::test]
async fn test_translateCues_withRandomLatency_shouldKeepCueOrder() {
    let cues = make_cues("Cue", 12);

    for limit in 1..=cues.len() {
        let provider = MockProvider::working().with_latency(0, 15);
        let translator = BatchTranslator::new(mock_service(&provider, limit));

        let entries = translator.translate_cues(&cues, "en", "fr", None).await.unwrap();

        let indices: Vec<usize> = entries.iter().map(|e| e.seq_num).collect();
        assert_eq!(indices, (1..=cues.len()).collect::<Vec<_>>(), "limit {}", limit);

        for (entry, cue) in entries.iter().zip(&cues) {
            assert_eq!(entry.text, MockProvider::expected_translation("fr", &cue.text));
            assert_eq!(entry.start_time_ms, cue.start_ms);
            assert_eq!(entry.end_time_ms, cue.end_ms());
        }
    }
}

#[tokio::test]
async fn test_translateCues_shouldNeverExceedConcurrencyLimit() {
    let cues = make_cues("Cue", 40);

    for limit in [1, 3, 8] {
        let provider = MockProvider::working().with_latency(1, 10);
        let stats = provider.stats();
        let translator = BatchTranslator::new(mock_service(&provider, limit));

        translator.translate_cues(&cues, "en", "de", None).await.unwrap();

        let max_in_flight = stats.max_in_flight.load(Ordering::SeqCst);
        assert!(max_in_flight <= limit, "limit {} but saw {} in flight", limit, max_in_flight);
        assert!(max_in_flight >= 1);
        assert_eq!(stats.started.load(Ordering::SeqCst), cues.len());
        assert_eq!(stats.in_flight.load(Ordering::SeqCst), 0);
    }
}

/// Enough latency and permits that the limit is actually reached
#[tokio::test(start_paused = true)]
async fn test_translateCues_withSlowService_shouldFillAllPermits() {
    let cues = make_cues("Cue", 10);
    let provider = MockProvider::working().with_latency(50, 50);
    let stats = provider.stats();

    BatchTranslator::new(mock_service(&provider, 4))
        .translate_cues(&cues, "en", "fr", None)
        .await
        .unwrap();

    assert_eq!(stats.max_in_flight.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_translateCues_withEmptyTranslation_shouldKeepEmptyEntries() {
    let cues = make_cues("Cue", 3);
    let translator = BatchTranslator::new(mock_service(&MockProvider::empty(), 2));

    let entries = translator.translate_cues(&cues, "en", "fr", None).await.unwrap();

    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.text.is_empty()));
    assert!(render_srt(&entries).starts_with("1\n00:00:00,000 --> 00:00:00,800\n\n\n2\n"));
}

#[tokio::test]
async fn test_translateCues_withOneFailure_shouldFailWholeCall() {
    let cues = make_cues("Cue", 20);
    let provider = MockProvider::failing_on("Cue 7").with_latency(0, 5);
    let translator = BatchTranslator::new(mock_service(&provider, 4));

    let result = translator.translate_cues(&cues, "en", "fr", None).await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::ApiError { status_code: 500, .. }))
    ));
}

/// Requests still running or queued when one fails are dropped, not awaited
#[tokio::test(start_paused = true)]
async fn test_translateCues_withEarlyFailure_shouldCancelOutstandingRequests() {
    let limit = 5;
    let mut cues = make_cues("Cue", 30);
    cues[0].text = "boom".to_string();

    // The failing cue answers at once, every other one takes 100ms
    let provider = MockProvider::failing_on("boom").with_latency(100, 100);
    let stats = provider.stats();
    let translator = BatchTranslator::new(mock_service(&provider, limit));

    let result = translator.translate_cues(&cues, "en", "fr", None).await;
    assert!(result.is_err());

    // Only the first permit batch ever started, and only the failure finished
    let started = stats.started.load(Ordering::SeqCst);
    assert!(started >= 1 && started <= limit, "started {} requests", started);
    assert_eq!(stats.finished.load(Ordering::SeqCst), 1);
    assert_eq!(stats.in_flight.load(Ordering::SeqCst), 0);

    // Nothing keeps running in the background
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(stats.started.load(Ordering::SeqCst), started);
    assert_eq!(stats.finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_translateCues_shouldReportProgressOncePerCue() {
    let cues = make_cues("Cue", 9);
    let provider = MockProvider::working().with_latency(0, 5);
    let translator = BatchTranslator::new(mock_service(&provider, 3));

    let calls = Mutex::new(Vec::new());
    let on_progress = |completed: usize, total: usize| calls.lock().push((completed, total));

    translator.translate_cues(&cues, "en", "fr", Some(&on_progress)).await.unwrap();

    let calls = calls.into_inner();
    assert_eq!(calls, (1..=9).map(|n| (n, 9)).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_validateLanguages_withExcludedCode_shouldFailBeforeAnyTranslation() {
    let provider = MockProvider::working().with_languages(&["en", "fr"]);
    let stats = provider.stats();
    let service = mock_service(&provider, 2);

    let result = service.validate_languages(&["en", "th"]).await;

    assert!(matches!(result, Err(TranslationError::InvalidLanguage(ref code)) if code == "th"));
    assert_eq!(stats.language_listings.load(Ordering::SeqCst), 1);
    assert_eq!(stats.started.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_validateLanguages_withServiceDown_shouldSurfaceProviderError() {
    let service = mock_service(&MockProvider::failing(), 2);
    let result = service.validate_languages(&["en"]).await;
    assert!(matches!(result, Err(TranslationError::Provider(ProviderError::ConnectionError(_)))));
}
