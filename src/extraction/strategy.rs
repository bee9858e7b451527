/*!
 * Extraction strategies as data.
 *
 * The fallback order lives in `build_chain`; `first_success` evaluates any
 * list of attempts and stops at the first one that yields a file. Running an
 * attempt is the engine's job.
 */

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use log::debug;

/// Container formats tried with stream copy, with the file extension that selects the muxer
pub const REMUX_EXTENSIONS: [&str; 4] = ["vtt", "srt", "ass", "ssa"];

/// Text codecs tried as a last resort
pub const FALLBACK_CODECS: [&str; 5] = ["webvtt", "ass", "subrip", "mov_text", "text"];

/// Bitmap codecs that can never become text
pub const IMAGE_CODECS: [&str; 5] = ["hdmv_pgs_subtitle", "dvd_subtitle", "dvdsub", "dvb_subtitle", "xsub"];

/// Check if a subtitle codec is bitmap-based (cannot be converted to text SRT)
pub fn is_image_codec(codec_name: &str) -> bool {
    IMAGE_CODECS.contains(&codec_name)
}

/// Which strategy an attempt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyId {
    /// `mkvextract tracks`, matroska only
    DedicatedExtractor,
    /// ffmpeg stream copy into the container with this extension
    RemuxCopy(&'static str),
    /// ffmpeg re-encode with the `srt` codec
    ReencodeSrt,
    /// ffmpeg with the `srt` output format forced
    ForceSrtFormat,
    /// ffmpeg re-encode through the given codec
    ReencodeCodec(&'static str),
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyId::DedicatedExtractor => write!(f, "mkvextract"),
            StrategyId::RemuxCopy(ext) => write!(f, "copy to .{}", ext),
            StrategyId::ReencodeSrt => write!(f, "re-encode to srt"),
            StrategyId::ForceSrtFormat => write!(f, "force srt format"),
            StrategyId::ReencodeCodec(codec) => write!(f, "re-encode via {}", codec),
        }
    }
}

/// ffmpeg options of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptOptions {
    /// `-c:s copy`
    pub copy: bool,
    /// `-c:s <codec>`, ignored when `copy` is set
    pub codec: Option<&'static str>,
    /// `-f <format>`
    pub format: Option<&'static str>,
    /// `-fix_sub_duration` on the input
    pub fix_sub_duration: bool,
}

/// One step of the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionAttempt {
    pub strategy: StrategyId,
    pub options: AttemptOptions,
    /// Extension of the file the tool writes; anything but `srt` is converted afterwards
    pub output_extension: &'static str,
}

impl ExtractionAttempt {
    /// Whether the produced file still has to be converted to SRT
    pub fn needs_conversion(&self) -> bool {
        self.output_extension != "srt"
    }
}

/// Result of running one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A non-empty SRT file at this path
    Success(PathBuf),
    /// The tool finished but produced nothing usable
    Empty,
    /// The tool failed; filtered diagnostics
    ToolError(String),
}

/// The ordered fallback chain for one stream
pub fn build_chain(use_dedicated_extractor: bool) -> Vec<ExtractionAttempt> {
    let mut chain = Vec::new();

    if use_dedicated_extractor {
        chain.push(ExtractionAttempt {
            strategy: StrategyId::DedicatedExtractor,
            options: AttemptOptions::default(),
            output_extension: "srt",
        });
    }

    for ext in REMUX_EXTENSIONS {
        chain.push(ExtractionAttempt {
            strategy: StrategyId::RemuxCopy(ext),
            options: AttemptOptions { copy: true, fix_sub_duration: true, ..Default::default() },
            output_extension: ext,
        });
    }

    chain.push(ExtractionAttempt {
        strategy: StrategyId::ReencodeSrt,
        options: AttemptOptions { codec: Some("srt"), fix_sub_duration: true, ..Default::default() },
        output_extension: "srt",
    });

    chain.push(ExtractionAttempt {
        strategy: StrategyId::ForceSrtFormat,
        options: AttemptOptions { format: Some("srt"), fix_sub_duration: true, ..Default::default() },
        output_extension: "srt",
    });

    for codec in FALLBACK_CODECS {
        chain.push(ExtractionAttempt {
            strategy: StrategyId::ReencodeCodec(codec),
            options: AttemptOptions { codec: Some(codec), fix_sub_duration: true, ..Default::default() },
            output_extension: "srt",
        });
    }

    chain
}

/// Run attempts in order until one succeeds
pub async fn first_success<F, Fut>(attempts: &[ExtractionAttempt], mut run: F) -> Option<PathBuf>
where
    F: FnMut(ExtractionAttempt) -> Fut,
    Fut: Future<Output = AttemptOutcome>,
{
    let total = attempts.len();
    for (i, attempt) in attempts.iter().enumerate() {
        match run(*attempt).await {
            AttemptOutcome::Success(path) => {
                debug!("  [{}/{}] {}: succeeded", i + 1, total, attempt.strategy);
                return Some(path);
            }
            AttemptOutcome::Empty => {
                debug!("  [{}/{}] {}: no output", i + 1, total, attempt.strategy);
            }
            AttemptOutcome::ToolError(diagnostics) => {
                debug!("  [{}/{}] {}: failed\n{}", i + 1, total, attempt.strategy, diagnostics);
            }
        }
    }
    None
}

/// Arguments of an ffmpeg extraction invocation
pub fn ffmpeg_extraction_args(video: &str, stream_index: usize, options: &AttemptOptions, output: &str) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into()];
    if options.fix_sub_duration {
        args.push("-fix_sub_duration".into());
    }
    args.extend(["-i".into(), video.to_string()]);
    args.extend(["-map".into(), format!("0:{}", stream_index)]);

    if options.copy {
        args.extend(["-c:s".into(), "copy".into()]);
    } else if let Some(codec) = options.codec {
        args.extend(["-c:s".into(), codec.to_string()]);
    }

    if let Some(format) = options.format {
        args.extend(["-f".into(), format.to_string()]);
    }

    args.extend(["-avoid_negative_ts".into(), "make_zero".into()]);
    args.push(output.to_string());
    args
}

/// Arguments that re-encode a subtitle file to SRT
pub fn ffmpeg_conversion_args(input: &str, output: &str) -> Vec<String> {
    vec![
        "-y".into(),
        "-i".into(), input.to_string(),
        "-c:s".into(), "srt".into(),
        output.to_string(),
    ]
}

/// Native file extension for a codec extracted by mkvextract
pub fn dedicated_extractor_extension(codec_name: Option<&str>) -> &'static str {
    match codec_name {
        Some("subrip") | Some("srt") => "srt",
        Some("ass") => "ass",
        Some("ssa") => "ssa",
        Some("webvtt") => "vtt",
        _ => "vtt",
    }
}
