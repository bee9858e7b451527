/*!
 * Fake external tools for extraction tests.
 *
 * - `RecordingToolRunner` records every invocation and answers through a
 *   responder closure, optionally writing the file the tool would produce
 * - `FakeProbe` returns a fixed stream list
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::fs;
use std::path::Path;

use subtrans::errors::{ExtractionError, ToolError};
use subtrans::extraction::{ProbeResult, StreamProbe, SubtitleStream, ToolOutput, ToolRunner};

/// One recorded tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCall {
    /// The output file argument (last argument, without an mkvextract track prefix)
    pub fn output(&self) -> String {
        let last = self.args.last().cloned().unwrap_or_default();
        if self.is_mkvextract_tracks() {
            return last.split_once(':').map(|(_, path)| path.to_string()).unwrap_or(last);
        }
        last
    }

    pub fn is_version_check(&self) -> bool {
        self.args.first().map(String::as_str) == Some("--version")
    }

    pub fn is_mkvextract_tracks(&self) -> bool {
        self.program == "mkvextract" && self.args.first().map(String::as_str) == Some("tracks")
    }

    /// Whether `flag value` appears in the arguments
    pub fn has_option(&self, flag: &str, value: &str) -> bool {
        self.args.windows(2).any(|pair| pair[0] == flag && pair[1] == value)
    }
}

type Responder = Box<dyn Fn(&ToolCall) -> ToolOutput + Send + Sync>;

/// Tool runner that records calls instead of starting processes
pub struct RecordingToolRunner {
    calls: Mutex<Vec<ToolCall>>,
    responder: Responder,
}

impl fmt::Debug for RecordingToolRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingToolRunner")
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

impl RecordingToolRunner {
    pub fn new(responder: impl Fn(&ToolCall) -> ToolOutput + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Every invocation fails, including `mkvextract --version`
    pub fn failing() -> Self {
        Self::new(|_| ToolOutput::failed(1, "Subtitle encoding currently only possible from text to text or bitmap to bitmap"))
    }

    /// `mkvextract --version` works, every extraction fails
    pub fn with_mkvextract_only_installed() -> Self {
        Self::new(|call| {
            if call.is_version_check() {
                ToolOutput::succeeded()
            } else {
                ToolOutput::failed(2, "Error: extraction failed")
            }
        })
    }

    /// Every extraction succeeds and writes `content` to its output file
    pub fn writing(content: &'static str) -> Self {
        Self::new(move |call| {
            if call.is_version_check() {
                return ToolOutput::succeeded();
            }
            match fs::write(call.output(), content) {
                Ok(()) => ToolOutput::succeeded(),
                Err(e) => ToolOutput::failed(1, e.to_string()),
            }
        })
    }

    /// Every invocation exits cleanly without writing anything
    pub fn silent() -> Self {
        Self::new(|_| ToolOutput::succeeded())
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<ToolCall> {
        self.calls().into_iter().filter(|call| call.program == program).collect()
    }
}

#[async_trait]
impl ToolRunner for RecordingToolRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ToolError> {
        let call = ToolCall {
            program: program.to_string(),
            args: args.to_vec(),
        };
        self.calls.lock().push(call.clone());
        Ok((self.responder)(&call))
    }
}

/// Probe that reports a fixed container layout
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    result: ProbeResult,
    fail: bool,
}

impl FakeProbe {
    pub fn new(format_name: Option<&str>, streams: Vec<SubtitleStream>) -> Self {
        Self {
            result: ProbeResult {
                format_name: format_name.map(|f| f.to_string()),
                streams,
            },
            fail: false,
        }
    }

    /// An mp4 container with the given subtitle codecs at indexes 2, 3, ...
    pub fn mp4(codecs: &[&str]) -> Self {
        Self::new(Some("mov,mp4,m4a,3gp,3g2,mj2"), streams(codecs))
    }

    /// A matroska container with the given subtitle codecs at indexes 2, 3, ...
    pub fn matroska(codecs: &[&str]) -> Self {
        Self::new(Some("matroska,webm"), streams(codecs))
    }

    /// A probe that cannot read the container
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }
}

fn streams(codecs: &[&str]) -> Vec<SubtitleStream> {
    codecs
        .iter()
        .enumerate()
        .map(|(i, codec)| SubtitleStream::new(i + 2, Some(codec)))
        .collect()
}

#[async_trait]
impl StreamProbe for FakeProbe {
    async fn probe(&self, video_path: &Path) -> Result<ProbeResult, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::Probe {
                path: video_path.to_path_buf(),
                reason: "Invalid data found when processing input".to_string(),
            });
        }
        Ok(self.result.clone())
    }
}
