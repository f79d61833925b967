use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{self, SubtitleCollection, TrackSet, render_srt};
use crate::track_selector::{self, AUTO_LANGUAGE, TrackSelection};
use crate::translation::{BatchTranslator, ProgressFn, TranslationService};

// @module: Application controller for subtitle processing

/// Extension of the containers picked up in folder mode
const CONTAINER_EXTENSION: &str = "mkv";

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Subtitles were written to this path
    Written(PathBuf),
    /// The output already existed and overwriting was not forced
    Skipped(PathBuf),
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Remote translation service
    service: TranslationService,
}

impl Controller {
    // @method: Create a new controller talking to the configured endpoint
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(&config.translation)
            .context("Failed to create translation service")?;
        Ok(Self::with_service(config, service))
    }

    // @method: Create a controller around an existing translation service
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        Self { config, service }
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the main workflow with input video file and output directory
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<FileOutcome> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite).await
    }

    /// Run the controller with progress reporting
    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<FileOutcome> {
        let start_time = Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = FileManager::generate_output_path(input_file, output_dir, &self.config.target_language, "srt");
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite): {:?}", output_path);
            return Ok(FileOutcome::Skipped(output_path));
        }

        let tracks = self.read_tracks(input_file).await?;

        let progress_bar = self.config.show_progress.then(|| {
            let bar = multi_progress.add(ProgressBar::new(0));
            bar.set_style(Self::progress_style("cues"));
            bar.set_message("Translating");
            bar
        });
        let on_progress = progress_bar.clone().map(|bar| {
            move |completed: usize, total: usize| {
                bar.set_length(total as u64);
                bar.set_position(completed as u64);
            }
        });

        let result = self
            .translate_track_set(&tracks, on_progress.as_ref().map(|f| f as &ProgressFn<'_>))
            .await;

        // The bar must go before any error gets logged
        if let Some(bar) = progress_bar {
            bar.finish_and_clear();
        }
        let srt = result?;

        FileManager::write_to_file(&output_path, &srt)?;
        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(FileOutcome::Written(output_path))
    }

    /// Gate the container type, then read its text subtitle tracks
    pub async fn read_tracks(&self, input_file: &Path) -> Result<TrackSet> {
        FileManager::check_file_type(input_file)?;
        debug!("Extracting subtitle tracks from {:?}", input_file);
        subtitle_processor::extract_track_set(input_file).await
    }

    /// Select the source track the configuration asks for, warning on fallback
    pub fn select_track<'a>(&'a self, tracks: &'a TrackSet) -> Result<TrackSelection<'a>> {
        let selection = track_selector::select_source_track(tracks, &self.config.source_language, self.config.track_type)?;

        if selection.effective_language != self.config.source_language {
            warn!(
                "No '{}' subtitle track found, using track {} and letting the service detect the language",
                self.config.source_language, selection.track_id
            );
        } else {
            info!(
                "Using subtitle track {} ({} cues)",
                selection.track_id,
                selection.track.cue_count()
            );
        }

        Ok(selection)
    }

    /// Select, validate and translate, returning the SRT text of the translated track
    pub async fn translate_track_set(&self, tracks: &TrackSet, on_progress: Option<&ProgressFn<'_>>) -> Result<String> {
        let selection = self.select_track(tracks)?;
        let source_language = selection.effective_language;
        let target_language = self.config.target_language.as_str();

        let mut languages = Vec::with_capacity(2);
        if source_language != AUTO_LANGUAGE {
            languages.push(source_language);
        }
        languages.push(target_language);
        self.service.validate_languages(&languages).await?;

        let translator = BatchTranslator::new(self.service.clone());
        let entries = translator
            .translate_cues(&selection.track.cues, source_language, target_language, on_progress)
            .await?;

        Ok(render_srt(&entries))
    }

    /// Translate the subtitles of a container, returning the SRT text
    pub async fn translate_subtitles(&self, input_file: &Path) -> Result<String> {
        let tracks = self.read_tracks(input_file).await?;
        self.translate_track_set(&tracks, None).await
    }

    /// Write the selected source track untranslated as `<stem>.<source>.srt`
    pub async fn extract_only(&self, input_file: &Path, output_dir: &Path, force_overwrite: bool) -> Result<FileOutcome> {
        let tracks = self.read_tracks(input_file).await?;
        let selection = self.select_track(&tracks)?;

        let output_path = FileManager::generate_output_path(input_file, output_dir, selection.effective_language, "srt");
        if output_path.exists() && !force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output_path);
            return Ok(FileOutcome::Skipped(output_path));
        }

        let collection = SubtitleCollection::from_track(
            input_file.to_path_buf(),
            selection.effective_language.to_string(),
            selection.track,
        );
        collection.write_to_srt(&output_path)?;
        info!("Success: {:?}", output_path);

        Ok(FileOutcome::Written(output_path))
    }

    /// Run the workflow in folder mode, processing every container under a directory
    /// Files that already have translated subtitles will be skipped
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let video_files = FileManager::find_files(&input_dir, CONTAINER_EXTENSION)?;
        if video_files.is_empty() {
            return Err(anyhow!("No video files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(video_files.len() as u64));
        folder_pb.set_style(Self::progress_style("files"));
        folder_pb.set_message("Processing files");

        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for video_file in &video_files {
            let file_name = video_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = video_file.parent().map(Path::to_path_buf).unwrap_or_else(|| input_dir.clone());

            match self.run_with_progress(video_file, &output_dir, &multi_progress, force_overwrite).await {
                Ok(FileOutcome::Written(_)) => success_count += 1,
                Ok(FileOutcome::Skipped(_)) => skip_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors ({})",
            success_count,
            skip_count,
            error_count,
            Self::format_duration(start_time.elapsed())
        );

        Ok(())
    }

    fn progress_style(unit: &str) -> ProgressStyle {
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        );
        ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Short human-readable duration for log lines
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
