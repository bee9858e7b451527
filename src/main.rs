// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};

use subtrans::app_config::{self, Config, TranslationProvider};
use subtrans::app_controller::{Controller, RunOptions, VideoOutcome};
use subtrans::file_utils::FileManager;
use subtrans::providers;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subtrans - extract the embedded subtitle of a video and translate it
///
/// Pulls the first text subtitle stream out of a video with ffmpeg (or
/// mkvextract for Matroska files) and translates it with an LLM provider.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "Extract and translate embedded video subtitles")]
#[command(long_about = "subtrans extracts the embedded subtitle of a video file and translates it with an LLM provider.

EXAMPLES:
    subtrans movie.mkv                          # Translate using conf.json
    subtrans -t Spanish movie.mkv               # Translate to Spanish (writes movie.es.srt)
    subtrans -f movie.mkv                       # Ignore subtitles that already exist
    subtrans -p ollama -m llama3.2:3b movie.mp4 # Use a specific provider and model
    subtrans -e movie.mkv                       # Extract only (writes movie.extracted.srt)
    subtrans --log-level debug /movies/         # Process an entire directory
    subtrans completions bash > subtrans.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file does not exist
    a default one is created. Command line options override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Target language name (e.g. 'Spanish', 'French')
    #[arg(short, long, env = "TARGET_LANG")]
    target_language: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// API key for the translation provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Translate even when a subtitle in the target language already exists
    #[arg(short, long)]
    force_overwrite: bool,

    /// Do not detect the language of the extracted subtitle
    #[arg(short, long)]
    skip_detection: bool,

    /// Extract the subtitle without translating it
    #[arg(short, long)]
    extract_only: bool,
}

/// File that mirrors console output, set once the config is loaded
static LOG_FILE: OnceCell<PathBuf> = OnceCell::new();

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; `set_max_level` does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (color, tag) = Self::style_for_level(record.level());

        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());

        if let Some(path) = LOG_FILE.get() {
            // Logging from here would recurse
            let _ = FileManager::append_to_log_file(path, &format!("{} {}", tag, record.args()));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
        return Ok(());
    }

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

/// Load the config file, creating it with defaults when absent
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save_to_file(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

/// Command line options take precedence over the config file
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(api_key) = &options.api_key {
        // The env fallback is OpenAI's; do not clobber another provider's key
        let is_openai = config.translation.provider == TranslationProvider::OpenAI;
        let provider_config = config.translation.active_provider_config_mut();
        if is_openai || provider_config.api_key.is_empty() {
            provider_config.api_key = api_key.clone();
        }
    }

    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run(options: CommandLineOptions) -> Result<()> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options);
    config.validate().context("Configuration validation failed")?;

    log::set_max_level(config.log_level.to_level_filter());
    if let Some(log_file) = &config.log_file {
        let _ = LOG_FILE.set(PathBuf::from(log_file));
    }

    let provider = providers::build_provider(&config.translation)
        .context("Failed to create translation provider")?;
    let model = config.translation.get_model();
    info!(
        "Using {} ({}), target language: {}",
        provider.name(),
        model,
        config.target_language
    );
    if !options.extract_only {
        provider
            .test_connection(&model)
            .await
            .with_context(|| format!("Cannot reach {} at {}", provider.name(), config.translation.get_endpoint()))?;
    }

    let run_options = RunOptions {
        force_overwrite: options.force_overwrite,
        skip_detection: options.skip_detection,
        extract_only: options.extract_only,
    };
    let controller = Controller::with_config(config, provider);

    if input_path.is_file() {
        let outcome = controller.run(&input_path, run_options).await?;
        report(&controller, &outcome);
    } else if input_path.is_dir() {
        let summary = controller.run_folder(&input_path, run_options).await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} of {} file(s) failed", summary.failed, summary.total()));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}

fn report(controller: &Controller, outcome: &VideoOutcome) {
    match outcome {
        VideoOutcome::Translated { path, .. } => info!("Translated subtitle written to {:?}", path),
        VideoOutcome::AlreadyInTarget { detected, .. } => info!("Subtitle is already in {}, nothing to do", detected),
        VideoOutcome::ExistingSubtitle { path, .. } => info!("Existing subtitle kept: {:?}", path),
        VideoOutcome::Extracted { path } => info!("Extracted subtitle written to {:?}", path),
        VideoOutcome::NoSubtitles => warn!("No subtitles could be extracted"),
    }
    if let Some(usage) = outcome.usage() {
        controller.log_usage(usage);
    }
}
