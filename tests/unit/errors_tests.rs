/*!
 * Tests for error types
 */

use subtranslate::errors::{AppError, ProviderError, SubtitleError, TranslationError};

#[test]
fn test_subtitleError_display_shouldDescribeFailure() {
    assert_eq!(
        SubtitleError::NoTracksFound.to_string(),
        "No subtitle tracks found in the video provided"
    );
    assert_eq!(SubtitleError::UnsupportedFileType.to_string(), "Unsupported file type provided");
}

#[test]
fn test_translationError_invalidLanguage_shouldNameTheCode() {
    let error = TranslationError::InvalidLanguage("xx".to_string());
    assert!(error.to_string().contains("xx"));
}

#[test]
fn test_translationError_fromProviderError_shouldWrap() {
    let error: TranslationError = ProviderError::RateLimitExceeded("slow down".to_string()).into();
    assert!(matches!(error, TranslationError::Provider(ProviderError::RateLimitExceeded(_))));
}

#[test]
fn test_appError_conversions_shouldPickVariant() {
    let error: AppError = SubtitleError::UnsupportedFileType.into();
    assert!(matches!(error, AppError::Subtitle(SubtitleError::UnsupportedFileType)));

    let error: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(error, AppError::File(_)));

    let error: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(error, AppError::Unknown(ref m) if m == "boom"));
}

/// Domain errors survive a trip through anyhow
#[test]
fn test_subtitleError_throughAnyhow_shouldDowncast() {
    let error = anyhow::Error::from(SubtitleError::NoTracksFound);
    assert!(matches!(error.downcast_ref::<SubtitleError>(), Some(SubtitleError::NoTracksFound)));
}
