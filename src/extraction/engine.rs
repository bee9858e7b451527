use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use log::{debug, info, warn};

use crate::app_config::ExtractionConfig;
use crate::errors::{ExtractionError, ToolError};
use crate::extraction::probe::{FfprobeStreamProbe, StreamProbe, SubtitleStream};
use crate::extraction::strategy::{
    self, AttemptOutcome, ExtractionAttempt, StrategyId,
};
use crate::extraction::tool::{filter_ffmpeg_stderr, ProcessToolRunner, ToolOutput, ToolRunner};
use crate::file_utils::FileManager;
use crate::language_utils;

/// Container extensions handled by mkvextract
const MATROSKA_EXTENSIONS: [&str; 3] = ["mkv", "mka", "mks"];

/// Whether the probe or the file name says the container is matroska
pub fn is_matroska(video_path: &Path, format_name: Option<&str>) -> bool {
    if format_name.map_or(false, |f| f.to_lowercase().contains("matroska")) {
        return true;
    }
    video_path
        .extension()
        .map(|ext| MATROSKA_EXTENSIONS.contains(&ext.to_string_lossy().to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Finds the first text subtitle stream of a video and writes it as SRT
#[derive(Debug)]
pub struct ExtractionEngine {
    probe: Arc<dyn StreamProbe>,
    runner: Arc<dyn ToolRunner>,
    config: ExtractionConfig,
    /// Result of `mkvextract --version`, probed once
    dedicated_extractor: OnceCell<bool>,
}

impl ExtractionEngine {
    pub fn new(probe: Arc<dyn StreamProbe>, runner: Arc<dyn ToolRunner>, config: ExtractionConfig) -> Self {
        Self {
            probe,
            runner,
            config,
            dedicated_extractor: OnceCell::new(),
        }
    }

    /// Engine backed by real ffprobe/ffmpeg/mkvextract processes
    pub fn from_config(config: ExtractionConfig) -> Self {
        let runner: Arc<dyn ToolRunner> = Arc::new(ProcessToolRunner::new(config.timeout(), config.max_output_bytes));
        let probe: Arc<dyn StreamProbe> = Arc::new(FfprobeStreamProbe::new(config.ffprobe_path.clone(), runner.clone()));
        Self::new(probe, runner, config)
    }

    /// Extract the first usable subtitle stream to `<stem>.extracted.srt`
    ///
    /// Returns `Ok(None)` when the video has no text subtitle stream or every
    /// strategy failed for every stream.
    pub async fn extract(&self, video_path: &Path) -> Result<Option<PathBuf>, ExtractionError> {
        if !video_path.is_file() {
            return Err(ExtractionError::VideoNotFound(video_path.to_path_buf()));
        }

        let probe = self.probe.probe(video_path).await?;
        if probe.streams.is_empty() {
            info!("No subtitle streams found in {:?}", video_path);
            return Ok(None);
        }

        let target = FileManager::extraction_output_path(video_path);
        let matroska = is_matroska(video_path, probe.format_name.as_deref());
        let total = probe.streams.len();

        for (i, stream) in probe.streams.iter().enumerate() {
            let language = stream
                .language
                .as_deref()
                .map(|code| language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string()))
                .unwrap_or_else(|| "unknown".to_string());
            info!("Subtitle stream {}/{} (index: {}, codec: {}, language: {})",
                  i + 1, total, stream.index, stream.codec_label(), language);

            if stream.codec_name.as_deref().map_or(false, strategy::is_image_codec) {
                warn!("Subtitle codec '{}' is image-based and cannot be converted to text, skipping", stream.codec_label());
                continue;
            }

            let use_dedicated = matroska && self.config.use_mkvextract && self.dedicated_extractor_available().await;
            let chain = strategy::build_chain(use_dedicated);

            let extracted = strategy::first_success(&chain, |attempt| {
                self.run_attempt(video_path, stream, attempt, &target)
            }).await;

            if let Some(path) = extracted {
                info!("Extracted subtitle stream {} to {:?}", stream.index, path);
                return Ok(Some(path));
            }
            warn!("All extraction methods failed for stream {}", stream.index);
        }

        warn!("No subtitle stream of {:?} could be extracted as text", video_path);
        Ok(None)
    }

    /// Whether `mkvextract --version` runs, checked once per engine
    async fn dedicated_extractor_available(&self) -> bool {
        *self.dedicated_extractor.get_or_init(|| async {
            let args = vec!["--version".to_string()];
            match self.runner.run(&self.config.mkvextract_path, &args).await {
                Ok(output) if output.success => true,
                Ok(_) | Err(_) => {
                    info!("mkvextract not available, using ffmpeg only");
                    false
                }
            }
        }).await
    }

    async fn run_attempt(&self, video: &Path, stream: &SubtitleStream, attempt: ExtractionAttempt, target: &Path) -> AttemptOutcome {
        match attempt.strategy {
            StrategyId::DedicatedExtractor => self.run_dedicated_extractor(video, stream, target).await,
            _ => self.run_ffmpeg_attempt(video, stream, attempt, target).await,
        }
    }

    async fn run_dedicated_extractor(&self, video: &Path, stream: &SubtitleStream, target: &Path) -> AttemptOutcome {
        let extension = strategy::dedicated_extractor_extension(stream.codec_name.as_deref());
        let raw = FileManager::extraction_intermediate_path(video, extension);
        remove_stale(&raw);
        remove_stale(target);

        let args = vec![
            "tracks".to_string(),
            video.to_string_lossy().into_owned(),
            format!("{}:{}", stream.index, raw.to_string_lossy()),
        ];
        let result = self.runner.run(&self.config.mkvextract_path, &args).await;
        if let Some(diagnostics) = failure_diagnostics(result, false) {
            remove_stale(&raw);
            return AttemptOutcome::ToolError(diagnostics);
        }

        match verify_output(&raw) {
            AttemptOutcome::Success(_) => {}
            other => return other,
        }

        if raw.as_path() == target {
            return AttemptOutcome::Success(target.to_path_buf());
        }
        if extension == "srt" {
            return match fs::rename(&raw, target) {
                Ok(()) => AttemptOutcome::Success(target.to_path_buf()),
                Err(e) => {
                    remove_stale(&raw);
                    AttemptOutcome::ToolError(format!("Failed to move {:?} to {:?}: {}", raw, target, e))
                }
            };
        }

        let outcome = self.convert_to_srt(&raw, target).await;
        remove_stale(&raw);
        outcome
    }

    async fn run_ffmpeg_attempt(&self, video: &Path, stream: &SubtitleStream, attempt: ExtractionAttempt, target: &Path) -> AttemptOutcome {
        let output = if attempt.needs_conversion() {
            FileManager::extraction_intermediate_path(video, attempt.output_extension)
        } else {
            target.to_path_buf()
        };
        remove_stale(&output);

        let args = strategy::ffmpeg_extraction_args(
            &video.to_string_lossy(),
            stream.index,
            &attempt.options,
            &output.to_string_lossy(),
        );
        let result = self.runner.run(&self.config.ffmpeg_path, &args).await;
        if let Some(diagnostics) = failure_diagnostics(result, true) {
            remove_stale(&output);
            return AttemptOutcome::ToolError(diagnostics);
        }

        match verify_output(&output) {
            AttemptOutcome::Success(_) if attempt.needs_conversion() => {
                let outcome = self.convert_to_srt(&output, target).await;
                remove_stale(&output);
                outcome
            }
            outcome => outcome,
        }
    }

    /// Re-encode a subtitle file of any text format to SRT
    async fn convert_to_srt(&self, input: &Path, target: &Path) -> AttemptOutcome {
        remove_stale(target);
        let args = strategy::ffmpeg_conversion_args(&input.to_string_lossy(), &target.to_string_lossy());
        let result = self.runner.run(&self.config.ffmpeg_path, &args).await;
        if let Some(diagnostics) = failure_diagnostics(result, true) {
            remove_stale(target);
            return AttemptOutcome::ToolError(format!("Conversion to SRT failed: {}", diagnostics));
        }
        verify_output(target)
    }
}

/// Diagnostics of a failed invocation, `None` when the tool exited cleanly
fn failure_diagnostics(result: Result<ToolOutput, ToolError>, ffmpeg: bool) -> Option<String> {
    match result {
        Ok(output) if output.success => None,
        Ok(output) => {
            let stderr = if ffmpeg {
                filter_ffmpeg_stderr(&output.stderr)
            } else {
                format!("{}\n{}", output.stdout.trim(), output.stderr.trim()).trim().to_string()
            };
            Some(format!("exit code {:?}: {}", output.exit_code, stderr))
        }
        Err(e) => Some(e.to_string()),
    }
}

/// Success only for a non-empty file; an empty file is removed
fn verify_output(path: &Path) -> AttemptOutcome {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => {
            debug!("Created {} byte file {:?}", meta.len(), path);
            AttemptOutcome::Success(path.to_path_buf())
        }
        Ok(_) => {
            remove_stale(path);
            AttemptOutcome::Empty
        }
        Err(_) => AttemptOutcome::Empty,
    }
}

fn remove_stale(path: &Path) {
    if let Err(e) = FileManager::remove_if_exists(path) {
        warn!("Could not delete {:?}: {}", path, e);
    }
}
