/*!
 * Common test utilities for the subtranslate test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use subtranslate::app_config::Config;
use subtranslate::app_controller::Controller;
use subtranslate::providers::mock::MockProvider;
use subtranslate::subtitle_processor::{Cue, Track, TrackSet};
use subtranslate::translation::{TranslationOptions, TranslationService};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Bytes of a minimal EBML header carrying `doc_type`
pub fn ebml_header(doc_type: &str) -> Vec<u8> {
    let mut body = vec![0x42, 0x86, 0x81, 0x01, 0x42, 0xF7, 0x81, 0x01, 0x42, 0x82];
    body.push(0x80 | doc_type.len() as u8);
    body.extend_from_slice(doc_type.as_bytes());

    let mut header = vec![0x1A, 0x45, 0xDF, 0xA3];
    header.push(0x80 | body.len() as u8);
    header.extend(body);
    header
}

/// `count` cues with distinct texts `"<prefix> 1"`, `"<prefix> 2"`, ... one second apart
pub fn make_cues(prefix: &str, count: usize) -> Vec<Cue> {
    (0..count as u64)
        .map(|i| Cue::new(format!("{} {}", prefix, i + 1), i * 1000, 800))
        .collect()
}

/// A track in `language` with `cue_count` generated cues
pub fn make_track(language: Option<&str>, cue_count: usize) -> Track {
    Track::new(language, make_cues(language.unwrap_or("und"), cue_count))
}

/// Build a TrackSet from `(track_id, language, cue_count)` triples, in order
pub fn make_track_set(tracks: &[(u64, Option<&str>, usize)]) -> TrackSet {
    tracks
        .iter()
        .map(|(id, language, count)| (*id, make_track(*language, *count)))
        .collect()
}

/// Translation service backed by `provider`
pub fn mock_service(provider: &MockProvider, max_concurrent_requests: usize) -> TranslationService {
    TranslationService::with_provider(
        Arc::new(provider.clone()),
        TranslationOptions { max_concurrent_requests },
    )
}

/// Controller whose translation service is `provider`
pub fn mock_controller(config: Config, provider: &MockProvider) -> Controller {
    let limit = config.translation.concurrent_requests;
    Controller::with_service(config, mock_service(provider, limit))
}
