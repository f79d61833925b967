/*!
 * Tests for subtitle formatting, SRT parsing and collections
 */

use anyhow::Result;
use subtranslate::subtitle_processor::{
    Cue, SubtitleCollection, SubtitleEntry, Track, parse_srt_cues, render_srt,
};

use crate::common;

#[test]
fn test_formatTimestamp_withKnownValues_shouldMatchSrtLayout() {
    assert_eq!(SubtitleEntry::format_timestamp(61215), "00:01:01,215");
    assert_eq!(SubtitleEntry::format_timestamp(0), "00:00:00,000");
    assert_eq!(SubtitleEntry::format_timestamp(3_599_999), "00:59:59,999");
    assert_eq!(SubtitleEntry::format_timestamp(3_600_000), "01:00:00,000");
}

#[test]
fn test_parseTimestamp_shouldInvertFormat() {
    assert_eq!(SubtitleEntry::parse_timestamp("00:01:01,215").unwrap(), 61215);
    assert_eq!(SubtitleEntry::parse_timestamp("01:02:03.004").unwrap(), 3_723_004);
    assert!(SubtitleEntry::parse_timestamp("00:61:00,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("garbage").is_err());
    assert!(SubtitleEntry::parse_timestamp("9999999999999999:00:00,000").is_err());
}

#[test]
fn test_fromCue_shouldComputeEndTime() {
    let cue = Cue::new("Hi", 61215, 2000);
    let entry = SubtitleEntry::from_cue(4, &cue, "Salut".to_string());
    assert_eq!(entry.to_string(), "4\n00:01:01,215 --> 00:01:03,215\nSalut");
}

/// An empty text still yields a full block with an empty text line
#[test]
fn test_formatEntry_withEmptyText_shouldKeepEntry() {
    assert_eq!(
        SubtitleEntry::format_entry(2, 0, 500, ""),
        "2\n00:00:00,000 --> 00:00:00,500\n"
    );
}

#[test]
fn test_parseSrtCues_withCrlfAndBom_shouldParse() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,500\r\nSecond\r\n";
    let cues = parse_srt_cues(content).unwrap();
    assert_eq!(cues, vec![Cue::new("First", 1000, 1000), Cue::new("Second", 3000, 1500)]);
}

#[test]
fn test_parseSrtCues_withMalformedBlock_shouldSkipItAndRecover() {
    let content = "1\nnot a time range\nlost text\n\n2\n00:00:03,000 --> 00:00:04,000\nKept\n\n3\n00:00:05,000 --> 00:00:06,000\n\n4\n00:00:07,000 --> 00:00:08,000\nAlso kept\n";
    let cues = parse_srt_cues(content).unwrap();
    let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Kept", "", "Also kept"]);
}

/// Every cue in the container counts, including ones without text
#[test]
fn test_parseSrtCues_withEmptyCue_shouldKeepItInPlace() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFirst\n\n2\n00:00:03,000 --> 00:00:04,000\n\n\n3\n00:00:05,000 --> 00:00:06,000\n  Indented  \n";
    let cues = parse_srt_cues(content).unwrap();
    assert_eq!(
        cues,
        vec![
            Cue::new("First", 1000, 1000),
            Cue::new("", 3000, 1000),
            Cue::new("  Indented  ", 5000, 1000),
        ]
    );
}

#[test]
fn test_parseSrtCues_withHugeHours_shouldNotOverflow() {
    let content = "1\n99999999999999999999:00:00,000 --> 99999999999999999999:00:01,000\nFar away\n";
    let cues = parse_srt_cues(content).unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].start_ms, u64::MAX);
}

#[test]
fn test_renderSrt_roundTripThroughParser_shouldKeepCues() {
    let cues = common::make_cues("Line", 3);
    let entries: Vec<SubtitleEntry> = cues
        .iter()
        .enumerate()
        .map(|(i, cue)| SubtitleEntry::from_cue(i + 1, cue, cue.text.clone()))
        .collect();

    assert_eq!(parse_srt_cues(&render_srt(&entries)).unwrap(), cues);
}

#[test]
fn test_subtitleCollection_writeToSrt_shouldWriteRenderedTrack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let track = Track::new(Some("eng"), vec![Cue::new("Hello", 0, 1000), Cue::new("Bye", 2000, 1000)]);
    let collection = SubtitleCollection::from_track(temp_dir.path().join("movie.mkv"), "en".to_string(), &track);

    let output = temp_dir.path().join("nested").join("movie.en.srt");
    collection.write_to_srt(&output)?;

    let written = std::fs::read_to_string(&output)?;
    assert_eq!(
        written,
        "1\n00:00:00,000 --> 00:00:01,000\nHello\n\n2\n00:00:02,000 --> 00:00:03,000\nBye\n"
    );
    assert_eq!(collection.entries.len(), 2);
    Ok(())
}
