/*!
 * Tests for language utility functions
 */

use subtranslate::language_utils::{
    get_language_name, is_english, iso639_1_to_2, known_language_count,
};

/// Test the two-letter to container code mapping
#[test]
fn test_iso639_1_to_2_withCommonCodes_shouldMapToContainerCodes() {
    assert_eq!(iso639_1_to_2("en"), Some("eng"));
    assert_eq!(iso639_1_to_2("es"), Some("spa"));
    assert_eq!(iso639_1_to_2("ja"), Some("jpn"));
    assert_eq!(iso639_1_to_2("th"), Some("tha"));

    // Bibliographic forms, as written by muxers
    assert_eq!(iso639_1_to_2("fr"), Some("fre"));
    assert_eq!(iso639_1_to_2("nl"), Some("dut"));
    assert_eq!(iso639_1_to_2("cs"), Some("cze"));
}

/// A miss is a plain `None`, never a panic or an error
#[test]
fn test_iso639_1_to_2_withUnknownCodes_shouldReturnNone() {
    assert_eq!(iso639_1_to_2("qq"), None);
    assert_eq!(iso639_1_to_2("eng"), None);
    assert_eq!(iso639_1_to_2("e"), None);
}

#[test]
fn test_iso639_1_to_2_withCaseAndWhitespace_shouldNormalize() {
    assert_eq!(iso639_1_to_2("EN"), Some("eng"));
    assert_eq!(iso639_1_to_2(" de "), Some("ger"));
}

#[test]
fn test_knownLanguageCount_shouldCoverTheStandardTable() {
    assert!(known_language_count() >= 180);
}

#[test]
fn test_isEnglish_shouldOnlyMatchEng() {
    assert!(is_english("eng"));
    assert!(is_english("ENG"));
    assert!(!is_english("en"));
    assert!(!is_english("und"));
}

#[test]
fn test_getLanguageName_withValidCodes_shouldReturnNames() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert_eq!(get_language_name("spa").unwrap(), "Spanish");
    assert!(get_language_name("zz").is_err());
}
