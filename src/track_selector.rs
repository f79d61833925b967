/*!
 * Source subtitle track selection.
 *
 * Containers rarely tag a subtitle track as forced, regular or SDH, so when
 * several tracks share the requested language the selector tells them apart
 * by cue count: forced tracks carry a handful of lines, SDH tracks carry the
 * most (sound descriptions included) and the regular dialogue track is the
 * next smallest after the forced one.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::language_utils;
use crate::subtitle_processor::{Track, TrackSet};

/// Language reported when the requested one could not be honored
pub const AUTO_LANGUAGE: &str = "auto";

/// Track id used when no track matches the requested language
const FALLBACK_TRACK_ID: u64 = 1;

/// Which flavour of subtitle track to prefer among same-language tracks
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    /// Regular dialogue track
    #[default]
    Auto,
    /// Foreign-dialogue / on-screen text only
    Forced,
    /// Subtitles for the deaf and hard of hearing
    Sdh,
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Forced => "forced",
            Self::Sdh => "sdh",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TrackType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "forced" => Ok(Self::Forced),
            "sdh" => Ok(Self::Sdh),
            _ => Err(anyhow!("Invalid track type: {}", s)),
        }
    }
}

/// The track picked for translation
#[derive(Debug, Clone, Copy)]
pub struct TrackSelection<'a> {
    /// Container track number of the selected track
    pub track_id: u64,
    /// The selected track
    pub track: &'a Track,
    /// Language to translate from; `"auto"` when the requested one was not found
    pub effective_language: &'a str,
}

impl TrackSelection<'_> {
    /// Whether the selector had to give up on the requested language
    pub fn is_fallback(&self) -> bool {
        self.effective_language == AUTO_LANGUAGE
    }
}

/// Tracks whose language satisfies `matches`, fewest cues first.
/// The sort is stable, so equal cue counts keep container order.
fn candidates<'a>(tracks: &'a TrackSet, matches: impl Fn(Option<&str>) -> bool) -> Vec<(u64, &'a Track)> {
    let mut found: Vec<(u64, &Track)> = tracks
        .iter()
        .filter(|(_, track)| matches(track.language.as_deref()))
        .collect();
    found.sort_by_key(|(_, track)| track.cue_count());
    found
}

/// Pick among same-language candidates sorted by ascending cue count
fn disambiguate<T: Copy>(candidates: &[T], track_type: TrackType) -> Option<T> {
    match (candidates.len(), track_type) {
        (0, _) => None,
        (1, _) => candidates.first().copied(),
        (2, TrackType::Forced) => candidates.first().copied(),
        (2, TrackType::Auto | TrackType::Sdh) => candidates.get(1).copied(),
        (_, TrackType::Forced) => candidates.first().copied(),
        (_, TrackType::Auto) => candidates.get(1).copied(),
        (_, TrackType::Sdh) => candidates.last().copied(),
    }
}

/// Select the source track for `source_language` (two-letter code).
///
/// Falls back to track 1 with an `"auto"` effective language when nothing
/// matches. Fails with `NoTracksFound` when the set is empty or no track can
/// be resolved.
pub fn select_source_track<'a>(
    tracks: &'a TrackSet,
    source_language: &'a str,
    track_type: TrackType,
) -> Result<TrackSelection<'a>, SubtitleError> {
    if tracks.is_empty() {
        return Err(SubtitleError::NoTracksFound);
    }

    let container_code = language_utils::iso639_1_to_2(source_language);

    let mut matches = match container_code {
        Some(code) => candidates(tracks, |language| {
            language.is_some_and(|l| l.eq_ignore_ascii_case(code))
        }),
        None => Vec::new(),
    };

    // English tracks are often left untagged
    if matches.is_empty() && container_code.is_some_and(language_utils::is_english) {
        matches = candidates(tracks, |language| {
            language.is_none_or(|l| l.is_empty() || l.eq_ignore_ascii_case(language_utils::UNDETERMINED_PART2))
        });
    }

    debug!(
        "Source track candidates for '{}' ({}): {:?}",
        source_language,
        track_type,
        matches.iter().map(|(id, track)| (*id, track.cue_count())).collect::<Vec<_>>()
    );

    let selection = if matches.is_empty() {
        tracks.get(FALLBACK_TRACK_ID).map(|track| TrackSelection {
            track_id: FALLBACK_TRACK_ID,
            track,
            effective_language: AUTO_LANGUAGE,
        })
    } else {
        disambiguate(&matches, track_type).map(|(track_id, track)| TrackSelection {
            track_id,
            track,
            effective_language: source_language,
        })
    };

    selection.ok_or(SubtitleError::NoTracksFound)
}
