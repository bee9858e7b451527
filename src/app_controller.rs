use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::extraction::ExtractionEngine;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::Provider;
use crate::translation::{
    DetectedLanguage, FixedDelayRateLimiter, LanguageDetector, TokenUsage, TranslationEngine,
    TranslationOutcome,
};

// @module: Application controller for the extract-then-translate pipeline

/// Per-run switches coming from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Ignore subtitles that already exist next to the video
    pub force_overwrite: bool,
    /// Translate without asking which language the subtitle is in
    pub skip_detection: bool,
    /// Stop after writing `<stem>.extracted.srt`
    pub extract_only: bool,
}

/// What happened to one video
#[derive(Debug, Clone, PartialEq)]
pub enum VideoOutcome {
    /// A translated subtitle was written
    Translated { path: PathBuf, usage: TokenUsage },
    /// The extracted subtitle was already in the target language
    AlreadyInTarget { detected: DetectedLanguage, usage: TokenUsage },
    /// A subtitle in the target language already sits next to the video
    ExistingSubtitle { path: PathBuf, usage: TokenUsage },
    /// Extraction only; the artifact is left in place
    Extracted { path: PathBuf },
    /// No text subtitle stream could be extracted
    NoSubtitles,
}

impl VideoOutcome {
    pub fn usage(&self) -> Option<&TokenUsage> {
        match self {
            VideoOutcome::Translated { usage, .. }
            | VideoOutcome::AlreadyInTarget { usage, .. }
            | VideoOutcome::ExistingSubtitle { usage, .. } => Some(usage),
            VideoOutcome::Extracted { .. } | VideoOutcome::NoSubtitles => None,
        }
    }
}

impl From<TranslationOutcome> for VideoOutcome {
    fn from(outcome: TranslationOutcome) -> Self {
        match outcome {
            TranslationOutcome::Translated { path, usage } => VideoOutcome::Translated { path, usage },
            TranslationOutcome::Skipped { detected, usage } => VideoOutcome::AlreadyInTarget { detected, usage },
        }
    }
}

/// Counters reported at the end of directory mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub no_subtitles: usize,
    pub failed: usize,
    pub usage: TokenUsage,
}

impl FolderSummary {
    fn record(&mut self, outcome: &VideoOutcome) {
        match outcome {
            VideoOutcome::Translated { .. } | VideoOutcome::Extracted { .. } => self.translated += 1,
            VideoOutcome::AlreadyInTarget { .. } | VideoOutcome::ExistingSubtitle { .. } => self.skipped += 1,
            VideoOutcome::NoSubtitles => self.no_subtitles += 1,
        }
        if let Some(usage) = outcome.usage() {
            self.usage += usage;
        }
    }

    pub fn total(&self) -> usize {
        self.translated + self.skipped + self.no_subtitles + self.failed
    }
}

/// Main application controller for subtitle extraction and translation
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    extraction: ExtractionEngine,
    translation: TranslationEngine,
    detector: LanguageDetector,
}

impl Controller {
    // @method: Create a controller backed by real tools and the given provider
    pub fn with_config(config: Config, provider: Arc<dyn Provider>) -> Self {
        let extraction = ExtractionEngine::from_config(config.extraction.clone());
        let rate_limiter = Arc::new(FixedDelayRateLimiter::from_millis(config.translation.common.rate_limit_delay_ms));
        let translation = TranslationEngine::from_config(provider.clone(), rate_limiter, &config);
        let detector = LanguageDetector::from_config(provider, &config.translation);
        Self::with_engines(config, extraction, translation, detector)
    }

    // @method: Create a controller from prebuilt engines
    pub fn with_engines(
        config: Config,
        extraction: ExtractionEngine,
        translation: TranslationEngine,
        detector: LanguageDetector,
    ) -> Self {
        Self {
            config,
            extraction,
            translation,
            detector,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one video: existing-subtitle check, extraction, then translation
    pub async fn run(&self, video_path: &Path, options: RunOptions) -> Result<VideoOutcome> {
        if !FileManager::file_exists(video_path) {
            return Err(AppError::File(format!("Input file does not exist: {:?}", video_path)).into());
        }

        let target_language = self.config.target_language.as_str();
        info!("Processing {:?} (target: {})", video_path, target_language);

        if !options.force_overwrite {
            if let Some(outcome) = self.find_existing_subtitle(video_path, target_language, options.skip_detection).await {
                return Ok(outcome);
            }
        }

        let extracted = self
            .extraction
            .extract(video_path)
            .await
            .with_context(|| format!("Failed to extract subtitles from {:?}", video_path))?;

        let Some(extracted) = extracted else {
            warn!("No extractable subtitle stream in {:?}", video_path);
            return Ok(VideoOutcome::NoSubtitles);
        };

        if options.extract_only {
            info!("Extracted subtitle saved to {:?}", extracted);
            return Ok(VideoOutcome::Extracted { path: extracted });
        }

        let outcome = self
            .translation
            .translate(&extracted, video_path, target_language, options.skip_detection)
            .await
            .with_context(|| format!("Failed to translate subtitles of {:?}", video_path))?;

        Ok(outcome.into())
    }

    /// Subtitle files that may already hold the target language
    pub fn existing_subtitle_candidates(video_path: &Path, target_language: &str) -> Vec<PathBuf> {
        let code = language_utils::language_code_for(target_language);
        let lowered = target_language.trim().to_lowercase();
        let mut candidates = vec![FileManager::generate_output_path(video_path, &code, "srt")];
        if lowered != code {
            candidates.push(FileManager::generate_output_path(video_path, &lowered, "srt"));
        }
        candidates.push(video_path.with_extension("srt"));
        candidates
    }

    async fn find_existing_subtitle(&self, video_path: &Path, target_language: &str, skip_detection: bool) -> Option<VideoOutcome> {
        let candidates = Self::existing_subtitle_candidates(video_path, target_language);
        let plain = candidates.last().cloned();
        let mut usage = TokenUsage::new();

        for candidate in candidates {
            if !FileManager::is_non_empty_file(&candidate) {
                continue;
            }

            // The plain `<stem>.srt` says nothing about its language
            if skip_detection {
                if Some(&candidate) == plain.as_ref() {
                    continue;
                }
                info!("Subtitle already exists at {:?}, skipping (use --force-overwrite to redo)", candidate);
                return Some(VideoOutcome::ExistingSubtitle { path: candidate, usage });
            }

            debug!("Checking language of existing subtitle {:?}", candidate);
            let (detected, detection_usage) = self.detector.detect(&candidate).await;
            usage += detection_usage;

            if detected.matches(target_language) {
                info!("Existing subtitle {:?} is already in {}, skipping", candidate, target_language);
                return Some(VideoOutcome::ExistingSubtitle { path: candidate, usage });
            }
            debug!("Existing subtitle {:?} is in {}, not {}", candidate, detected, target_language);
        }

        None
    }

    // Format duration in a human-readable format
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

    /// Process every video under a directory, one at a time
    pub async fn run_folder(&self, input_dir: &Path, options: RunOptions) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(AppError::File(format!("Input directory does not exist: {:?}", input_dir)).into());
        }

        let video_files = FileManager::find_video_files(input_dir)
            .with_context(|| format!("Failed to scan {:?}", input_dir))?;
        if video_files.is_empty() {
            return Err(anyhow!("No video files found in directory: {:?}", input_dir));
        }
        info!("Found {} video file(s) in {:?}", video_files.len(), input_dir);

        let folder_pb = ProgressBar::new(video_files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for video_file in &video_files {
            let file_name = video_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run(video_file, options).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} translated, {} skipped, {} without subtitles, {} failed",
            Self::format_duration(start_time.elapsed()),
            summary.translated,
            summary.skipped,
            summary.no_subtitles,
            summary.failed
        );
        self.log_usage(&summary.usage);

        Ok(summary)
    }

    /// Log token usage and the estimated cost
    pub fn log_usage(&self, usage: &TokenUsage) {
        if usage.requests == 0 {
            return;
        }
        let common = &self.config.translation.common;
        info!("{}", usage.summary(common.input_cost_per_1k, common.output_cost_per_1k));
        debug!("Throughput: {:.0} tokens/min", usage.tokens_per_minute());
    }
}
