// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use subtranslate::app_config::{Config, LogLevel};
use subtranslate::app_controller::Controller;
use subtranslate::file_utils::FileManager;
use subtranslate::language_utils;
use subtranslate::subtitle_processor;
use subtranslate::track_selector::TrackType;

/// CLI Wrapper for TrackType to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTrackType {
    Auto,
    Forced,
    Sdh,
}

impl From<CliTrackType> for TrackType {
    fn from(cli_type: CliTrackType) -> Self {
        match cli_type {
            CliTrackType::Auto => TrackType::Auto,
            CliTrackType::Forced => TrackType::Forced,
            CliTrackType::Sdh => TrackType::Sdh,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate the subtitles of a video file or folder (default command)
    Translate(TranslateArgs),

    /// List the text subtitle tracks of a video file
    Tracks {
        /// Input video file
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,
    },

    /// Generate shell completions for subtranslate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: TranslateOptions,
}

/// Flags shared by the default command and `translate`
#[derive(clap::Args, Debug, Clone)]
struct TranslateOptions {
    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Which same-language source track to prefer
    #[arg(long, value_enum)]
    track_type: Option<CliTrackType>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Maximum number of translation requests in flight
    #[arg(long, env = "SUBTRANSLATE_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Attempts per translation request, first try included
    #[arg(long, env = "SUBTRANSLATE_MAX_ATTEMPTS")]
    max_attempts: Option<u32>,

    /// Translation service URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Translation service API key
    #[arg(long)]
    api_key: Option<String>,

    /// Do not draw progress bars
    #[arg(long)]
    no_progress: bool,

    /// Extract the source subtitle track without translation
    #[arg(short, long)]
    extract_only: bool,
}

/// subtranslate - translate the embedded subtitles of Matroska videos
///
/// Extracts the text subtitle tracks of a video, picks the source track and
/// sends every cue to a LibreTranslate-compatible translation service.
#[derive(Parser, Debug)]
#[command(name = "subtranslate")]
#[command(version)]
#[command(about = "Translate embedded video subtitles")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "subtranslate extracts subtitles from Matroska files and translates them cue by cue.

EXAMPLES:
    subtranslate movie.mkv                        # Translate using default config
    subtranslate -f movie.mkv                     # Force overwrite existing files
    subtranslate -s en -t es movie.mkv            # Translate from English to Spanish
    subtranslate --track-type sdh movie.mkv       # Prefer the hearing-impaired track
    subtranslate -e movie.mkv                     # Extract subtitles without translation
    subtranslate tracks movie.mkv                 # List subtitle tracks
    subtranslate --log-level debug /movies/       # Process entire directory with debug logging
    subtranslate completions bash > subtranslate.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (color, tag) = Self::style_for_level(record.level());
        let _ = writeln!(
            std::io::stderr(),
            "\x1B[{}m{} {} {}\x1B[0m",
            color,
            now,
            tag,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Err(e) = dispatch(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: CommandLineOptions) -> Result<()> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtranslate", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Tracks { input_path }) => list_tracks(&input_path).await,
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;
            run_translate(TranslateArgs { input_path, options: cli.options }).await
        }
    }
}

/// Load the config file and layer the command line on top of it
fn load_config(options: &TranslateOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(track_type) = options.track_type {
        config.track_type = track_type.into();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }
    if let Some(concurrency) = options.concurrency {
        config.translation.concurrent_requests = concurrency;
    }
    if let Some(max_attempts) = options.max_attempts {
        config.translation.max_attempts = max_attempts;
    }
    if let Some(endpoint) = &options.endpoint {
        config.translation.endpoint = endpoint.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.api_key = api_key.clone();
    }
    if options.no_progress {
        config.show_progress = false;
    }

    config.validate()?;
    Ok(config)
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    // Apply a command line log level before the config file is touched
    if let Some(level) = args.options.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    let config = load_config(&args.options)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    let input_path = args.input_path;
    let force_overwrite = args.options.force_overwrite;

    if FileManager::file_exists(&input_path) {
        let output_dir = input_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        if args.options.extract_only {
            controller.extract_only(&input_path, &output_dir, force_overwrite).await?;
        } else {
            controller.run(input_path, output_dir, force_overwrite).await?;
        }
    } else if FileManager::dir_exists(&input_path) {
        if args.options.extract_only {
            for video_file in FileManager::find_files(&input_path, "mkv")? {
                let output_dir = video_file.parent().unwrap_or(Path::new(".")).to_path_buf();
                if let Err(e) = controller.extract_only(&video_file, &output_dir, force_overwrite).await {
                    error!("Error processing file {:?}: {:#}", video_file, e);
                }
            }
        } else {
            controller.run_folder(input_path, force_overwrite).await?;
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}

async fn list_tracks(input_path: &Path) -> Result<()> {
    FileManager::check_file_type(input_path)?;
    let tracks = subtitle_processor::extract_track_set(input_path).await?;

    info!("Found {} text subtitle track(s) in {:?}", tracks.len(), input_path);
    for (track_id, track) in tracks.iter() {
        let language = track.language.as_deref().unwrap_or("und");
        let language_name = language_utils::get_language_name(language).unwrap_or_else(|_| "Unknown".to_string());
        println!(
            "{:>3}  {:<4} {:<20} {:<10} {:>6} cues  {}",
            track_id,
            language,
            language_name,
            track.codec_name.as_deref().unwrap_or("unknown"),
            track.cue_count(),
            track.title.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
