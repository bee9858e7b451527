use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use serde::Deserialize;
use log::{debug, error};

use crate::errors::ExtractionError;
use crate::extraction::tool::ToolRunner;

/// Subtitle stream as reported by the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleStream {
    /// Stream index in the container
    pub index: usize,
    /// Codec name, if the probe reported one
    pub codec_name: Option<String>,
    /// Language tag
    pub language: Option<String>,
    /// Title tag
    pub title: Option<String>,
}

impl SubtitleStream {
    pub fn new(index: usize, codec_name: Option<&str>) -> Self {
        SubtitleStream {
            index,
            codec_name: codec_name.map(|c| c.to_string()),
            language: None,
            title: None,
        }
    }

    /// Codec name for logs
    pub fn codec_label(&self) -> &str {
        self.codec_name.as_deref().unwrap_or("unknown")
    }
}

/// What the probe found in a container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    /// Container format name(s), e.g. `matroska,webm`
    pub format_name: Option<String>,
    /// Subtitle streams in container order
    pub streams: Vec<SubtitleStream>,
}

/// Enumerates the subtitle streams of a video
#[async_trait]
pub trait StreamProbe: Send + Sync + Debug {
    async fn probe(&self, video_path: &Path) -> Result<ProbeResult, ExtractionError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: usize,
    #[serde(default)]
    codec_name: Option<String>,
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    tags: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    format_name: Option<String>,
}

fn tag(tags: &HashMap<String, serde_json::Value>, name: &str) -> Option<String> {
    tags.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str())
        .map(|value| value.to_string())
}

/// Parse `ffprobe -print_format json` output
pub fn parse_probe_output(json: &str) -> Result<ProbeResult, serde_json::Error> {
    let output: FfprobeOutput = serde_json::from_str(json)?;

    let mut streams: Vec<SubtitleStream> = output.streams
        .into_iter()
        .filter(|s| s.codec_type.as_deref().map_or(true, |t| t == "subtitle"))
        .map(|s| SubtitleStream {
            index: s.index,
            codec_name: s.codec_name.filter(|c| !c.is_empty()),
            language: tag(&s.tags, "language"),
            title: tag(&s.tags, "title"),
        })
        .collect();
    streams.sort_by_key(|s| s.index);

    Ok(ProbeResult {
        format_name: output.format.and_then(|f| f.format_name),
        streams,
    })
}

/// Probe backed by ffprobe
#[derive(Debug, Clone)]
pub struct FfprobeStreamProbe {
    ffprobe_path: String,
    runner: Arc<dyn ToolRunner>,
}

impl FfprobeStreamProbe {
    pub fn new(ffprobe_path: impl Into<String>, runner: Arc<dyn ToolRunner>) -> Self {
        Self { ffprobe_path: ffprobe_path.into(), runner }
    }
}

#[async_trait]
impl StreamProbe for FfprobeStreamProbe {
    async fn probe(&self, video_path: &Path) -> Result<ProbeResult, ExtractionError> {
        let probe_error = |reason: String| ExtractionError::Probe {
            path: video_path.to_path_buf(),
            reason,
        };

        let args: Vec<String> = vec![
            "-v".into(), "error".into(),
            "-print_format".into(), "json".into(),
            "-show_format".into(),
            "-show_streams".into(),
            "-select_streams".into(), "s".into(),
            video_path.to_string_lossy().into_owned(),
        ];

        let output = self.runner
            .run(&self.ffprobe_path, &args)
            .await
            .map_err(|e| probe_error(e.to_string()))?;

        if !output.success {
            error!("ffprobe failed: {}", output.stderr.trim());
            return Err(probe_error(format!("ffprobe exited with {:?}: {}", output.exit_code, output.stderr.trim())));
        }

        let result = parse_probe_output(&output.stdout)
            .map_err(|e| probe_error(format!("Failed to parse ffprobe JSON output: {}", e)))?;

        debug!("Found {} subtitle streams in {:?} (format: {})",
               result.streams.len(), video_path, result.format_name.as_deref().unwrap_or("unknown"));
        Ok(result)
    }
}
