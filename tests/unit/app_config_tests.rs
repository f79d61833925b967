/*!
 * Tests for application configuration
 */

use anyhow::Result;
use subtranslate::app_config::{Config, LogLevel, TranslationConfig};
use subtranslate::track_selector::TrackType;

use crate::common;

#[test]
fn test_default_shouldUseDocumentedValues() {
    let config = Config::default();
    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.track_type, TrackType::Auto);
    assert!(config.show_progress);
    assert_eq!(config.log_level, LogLevel::Info);

    let translation = TranslationConfig::default();
    assert_eq!(translation.concurrent_requests, 5);
    assert_eq!(translation.max_attempts, 10);
    assert_eq!(translation.endpoint, "http://localhost:5000");
    assert!(translation.api_key.is_empty());
}

#[test]
fn test_validate_withEmptyLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = String::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.source_language = "  ".to_string();
    assert!(config.validate().is_err());
}

/// Codes outside the ISO 639-1 table are left for the service to accept or refuse
#[test]
fn test_validate_withServiceSpecificCodes_shouldPass() -> Result<()> {
    for (source, target) in [("auto", "zh-TW"), ("en", "zt"), ("en", "pb"), ("en", "fr-CA"), ("eng", "fr")] {
        let mut config = Config::default();
        config.source_language = source.to_string();
        config.target_language = target.to_string();
        config.validate()?;
    }
    Ok(())
}

#[test]
fn test_validate_withZeroLimits_shouldFail() {
    let mut config = Config::default();
    config.translation.concurrent_requests = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.max_attempts = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = Config::default();
    config.translation.endpoint = "localhost without scheme".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config, Config::default());
    assert_eq!(Config::from_file(&path)?, config);
    Ok(())
}

#[test]
fn test_fromFile_withCustomValues_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "source_language": "es",
            "target_language": "th",
            "track_type": "sdh",
            "show_progress": false,
            "log_level": "debug",
            "translation": { "endpoint": "https://translate.example.com/", "max_attempts": 3 }
        }"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.track_type, TrackType::Sdh);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(!config.show_progress);
    assert_eq!(config.translation.max_attempts, 3);
    assert_eq!(config.translation.concurrent_requests, 5);
    config.validate()?;
    Ok(())
}

#[test]
fn test_fromFile_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::from_file(&path).is_err());
    Ok(())
}
