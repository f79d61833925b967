use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str};
use tokio::process::Command;

use crate::errors::SubtitleError;

// @module: Subtitle data model, SRT formatting and container extraction

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}):(\d{2}):(\d{2})[,.](\d{3}) --> (\d{2,}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timestamp pattern is valid")
});

const FFPROBE_TIMEOUT: Duration = Duration::from_secs(60);
const FFMPEG_TIMEOUT: Duration = Duration::from_secs(120);

// @struct: One timed subtitle unit as it appears in the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Subtitle text, may span several lines
    pub text: String,

    // @field: Start time in ms, container relative
    pub start_ms: u64,

    // @field: Display duration in ms
    pub duration_ms: u64,
}

impl Cue {
    pub fn new(text: impl Into<String>, start_ms: u64, duration_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            duration_ms,
        }
    }

    /// End of the display window in ms
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }
}

// @struct: One subtitle stream inside a container
#[derive(Debug, Clone, Default)]
pub struct Track {
    // @field: Three-letter language tag, None when the container omits it
    pub language: Option<String>,

    // @field: Cues in original appearance order
    pub cues: Vec<Cue>,

    // @field: Codec reported by the container probe
    pub codec_name: Option<String>,

    // @field: Track title reported by the container probe
    pub title: Option<String>,
}

impl Track {
    pub fn new(language: Option<&str>, cues: Vec<Cue>) -> Self {
        Self {
            language: language.map(str::to_string),
            cues,
            codec_name: None,
            title: None,
        }
    }

    pub fn cue_count(&self) -> usize {
        self.cues.len()
    }
}

/// Subtitle tracks of one container keyed by container track number.
///
/// Iteration follows insertion order, which is the order the container
/// declared its tracks in. Track selection relies on that order for
/// tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct TrackSet {
    tracks: Vec<(u64, Track)>,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a track, replacing in place if the id is already present
    pub fn insert(&mut self, track_id: u64, track: Track) {
        match self.tracks.iter_mut().find(|(id, _)| *id == track_id) {
            Some((_, existing)) => *existing = track,
            None => self.tracks.push((track_id, track)),
        }
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|(id, _)| *id == track_id)
            .map(|(_, track)| track)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &Track)> {
        self.tracks.iter().map(|(id, track)| (*id, track))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl FromIterator<(u64, Track)> for TrackSet {
    fn from_iter<I: IntoIterator<Item = (u64, Track)>>(iter: I) -> Self {
        let mut set = TrackSet::new();
        for (track_id, track) in iter {
            set.insert(track_id, track);
        }
        set
    }
}

/// Information about a subtitle stream as reported by ffprobe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleInfo {
    /// The ffprobe stream index
    pub index: usize,
    /// The codec name of the subtitle track
    pub codec_name: String,
    /// The language tag (ISO 639-2)
    pub language: Option<String>,
    /// The title of the subtitle track if available
    pub title: Option<String>,
}

impl SubtitleInfo {
    /// Matroska numbers tracks from 1 in declaration order, ffprobe from 0
    pub fn track_number(&self) -> u64 {
        self.index as u64 + 1
    }

    /// Bitmap subtitles (PGS/VobSub/DVB) cannot be turned into text
    pub fn is_bitmap(&self) -> bool {
        matches!(
            self.codec_name.as_str(),
            "hdmv_pgs_subtitle" | "dvd_subtitle" | "dvb_subtitle" | "xsub"
        )
    }
}

// @struct: Single rendered subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number, 1-based position of the source cue
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Build the entry for the cue at `seq_num` carrying `text`
    pub fn from_cue(seq_num: usize, cue: &Cue, text: String) -> Self {
        Self::new(seq_num, cue.start_ms, cue.end_ms(), text)
    }

    /// Parse an SRT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        // Parse HH:MM:SS,mmm format
        let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm).
    /// Hours grow past two digits for very long media.
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Render one SRT block: index, time range and text on separate lines
    pub fn format_entry(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: &str) -> String {
        format!(
            "{}\n{} --> {}\n{}",
            seq_num,
            Self::format_timestamp(start_time_ms),
            Self::format_timestamp(end_time_ms),
            text
        )
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        write!(f, "{}", self.text)
    }
}

/// Join rendered entries into the body of an SRT file
pub fn render_srt(entries: &[SubtitleEntry]) -> String {
    let mut body = entries
        .iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n\n");
    if !body.is_empty() {
        body.push('\n');
    }
    body
}

/// Collection of subtitle entries with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,

    /// Language of the entries
    pub language: String,
}

impl SubtitleCollection {
    /// Wrap a track's cues untranslated, numbered in cue order
    pub fn from_track(source_file: PathBuf, language: String, track: &Track) -> Self {
        let entries = track
            .cues
            .iter()
            .enumerate()
            .map(|(idx, cue)| SubtitleEntry::from_cue(idx + 1, cue, cue.text.clone()))
            .collect();

        SubtitleCollection {
            source_file,
            entries,
            language,
        }
    }

    /// The collection rendered as SRT text
    pub fn to_srt_string(&self) -> String {
        render_srt(&self.entries)
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        file.write_all(self.to_srt_string().as_bytes())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

/// List subtitle streams in a video file
pub async fn list_subtitle_tracks<P: AsRef<Path>>(video_path: P) -> Result<Vec<SubtitleInfo>> {
    let video_path = video_path.as_ref();

    if !video_path.exists() {
        return Err(anyhow!("Video file not found: {:?}", video_path));
    }

    let ffprobe_future = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_streams", "-select_streams", "s"])
        .arg(video_path)
        .output();

    let output = tokio::select! {
        result = ffprobe_future => {
            result.map_err(|e| anyhow!("Failed to execute ffprobe command: {}", e))?
        },
        _ = tokio::time::sleep(FFPROBE_TIMEOUT) => {
            return Err(anyhow!("ffprobe command timed out after {} seconds", FFPROBE_TIMEOUT.as_secs()));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ffprobe failed: {}", stderr);
        return Err(SubtitleError::ExtractionFailed(format!("ffprobe: {}", stderr.trim())).into());
    }

    parse_ffprobe_streams(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the JSON emitted by `ffprobe -show_streams`
pub fn parse_ffprobe_streams(stdout: &str) -> Result<Vec<SubtitleInfo>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    let json: Value = from_str(stdout).context("Failed to parse ffprobe JSON output")?;

    let Some(streams) = json.get("streams").and_then(|s| s.as_array()) else {
        return Ok(Vec::new());
    };

    let tracks = streams
        .iter()
        .map(|stream| {
            let tag = |name: &str| {
                stream
                    .get("tags")
                    .and_then(|t| t.get(name))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            };

            SubtitleInfo {
                index: stream.get("index").and_then(|v| v.as_u64()).unwrap_or(0) as usize,
                codec_name: stream
                    .get("codec_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string(),
                language: tag("language"),
                title: tag("title"),
            }
        })
        .collect();

    Ok(tracks)
}

/// Convert one subtitle stream to SRT text through ffmpeg
async fn extract_stream_as_srt(video_path: &Path, stream_index: usize) -> Result<String> {
    let ffmpeg_future = Command::new("ffmpeg")
        .arg("-v")
        .arg("error")
        .arg("-i")
        .arg(video_path)
        .args(["-map", &format!("0:{}", stream_index), "-f", "srt", "-"])
        .output();

    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg command for subtitle extraction: {}", e))?
        },
        _ = tokio::time::sleep(FFMPEG_TIMEOUT) => {
            return Err(anyhow!("ffmpeg command timed out after {} seconds", FFMPEG_TIMEOUT.as_secs()));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        error!("Subtitle extraction failed for stream {}: {}", stream_index, stderr.trim());
        return Err(SubtitleError::ExtractionFailed(stderr.trim().to_string()).into());
    }

    Ok(String::from_utf8_lossy(&result.stdout).into_owned())
}

/// Read every text subtitle track of a container into a `TrackSet`.
///
/// The whole container is consumed before returning, so callers only ever see
/// a complete set. A container without text subtitles yields
/// `SubtitleError::NoTracksFound`.
pub async fn extract_track_set<P: AsRef<Path>>(video_path: P) -> Result<TrackSet> {
    let video_path = video_path.as_ref();
    let streams = list_subtitle_tracks(video_path).await?;

    let bitmap_count = streams.iter().filter(|s| s.is_bitmap()).count();
    if bitmap_count > 0 {
        warn!(
            "Skipping {} bitmap subtitle track(s) (PGS/VobSub), only text-based tracks can be translated",
            bitmap_count
        );
    }

    let mut tracks = TrackSet::new();
    for info in streams.iter().filter(|s| !s.is_bitmap()) {
        let srt = extract_stream_as_srt(video_path, info.index).await?;
        let cues = parse_srt_cues(&srt)?;
        debug!(
            "Track {} ({}, {}): {} cues",
            info.track_number(),
            info.language.as_deref().unwrap_or("und"),
            info.codec_name,
            cues.len()
        );

        tracks.insert(info.track_number(), Track {
            language: info.language.clone(),
            cues,
            codec_name: Some(info.codec_name.clone()),
            title: info.title.clone(),
        });
    }

    if tracks.is_empty() {
        return Err(SubtitleError::NoTracksFound.into());
    }

    Ok(tracks)
}

/// Parse SRT text into cues, keeping the order they appear in.
///
/// Cue text is kept as written, and a cue without text stays as an empty cue.
/// Blocks with a malformed time range are skipped with a warning.
pub fn parse_srt_cues(content: &str) -> Result<Vec<Cue>> {
    let mut cues = Vec::new();

    // State variables for parsing
    let mut current_seq_num: Option<usize> = None;
    let mut current_times: Option<(u64, u64)> = None;
    let mut current_text = String::new();

    let mut flush = |seq_num: Option<usize>, times: Option<(u64, u64)>, text: &mut String| {
        if let (Some(seq_num), Some((start_ms, end_ms))) = (seq_num, times) {
            if end_ms < start_ms {
                warn!("Skipping subtitle entry {} with end before start", seq_num);
            } else {
                cues.push(Cue::new(text.as_str(), start_ms, end_ms - start_ms));
            }
        }
        text.clear();
    };

    for (line_idx, line) in content.lines().enumerate() {
        let trimmed = line.trim().trim_start_matches('\u{feff}');

        // A blank line always closes the block, malformed or not
        if trimmed.is_empty() {
            flush(current_seq_num.take(), current_times.take(), &mut current_text);
            continue;
        }

        if current_seq_num.is_none() && current_text.is_empty() {
            if let Ok(num) = trimmed.parse::<usize>() {
                current_seq_num = Some(num);
                continue;
            }
        }

        if current_seq_num.is_some() && current_times.is_none() {
            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                current_times = Some((timestamp_from_captures(&caps, 1), timestamp_from_captures(&caps, 5)));
                continue;
            }
        }

        if current_times.is_some() {
            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(line);
        } else {
            warn!("Unexpected text at line {} before sequence number or timestamp: {}", line_idx + 1, trimmed);
        }
    }

    flush(current_seq_num, current_times, &mut current_text);

    Ok(cues)
}

/// Milliseconds from one side of a time range, saturating on absurd hour counts
fn timestamp_from_captures(caps: &regex::Captures, start_idx: usize) -> u64 {
    let part = |offset: usize| -> u64 {
        caps.get(start_idx + offset)
            .map_or(0, |m| m.as_str().parse().unwrap_or(u64::MAX))
    };

    part(0)
        .saturating_mul(3_600_000)
        .saturating_add(part(1) * 60_000 + part(2) * 1_000 + part(3))
}
