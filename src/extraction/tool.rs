/*!
 * External tool invocation.
 *
 * `ToolRunner` is the seam between the extraction strategies and the
 * processes they start, so tests can record invocations without ffmpeg.
 */

use std::fmt::Debug;
use std::process::Stdio;
use std::time::Duration;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use log::debug;

use crate::errors::ToolError;

/// Captured result of a finished process
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,
    /// Captured standard output, lossily decoded
    pub stdout: String,
    /// Captured standard error, lossily decoded
    pub stderr: String,
    /// Whether either stream exceeded the capture limit
    pub truncated: bool,
}

impl ToolOutput {
    /// Output of a process that exited successfully with no output
    pub fn succeeded() -> Self {
        ToolOutput { success: true, exit_code: Some(0), ..Default::default() }
    }

    /// Output of a process that exited with the given code and error text
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        ToolOutput { success: false, exit_code: Some(exit_code), stderr: stderr.into(), ..Default::default() }
    }
}

/// Runs external programs
#[async_trait]
pub trait ToolRunner: Send + Sync + Debug {
    /// Run `program` with `args` to completion
    ///
    /// A non-zero exit is reported through `ToolOutput::success`; `Err` is
    /// reserved for processes that could not be started or did not finish.
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ToolError>;
}

/// Runs programs as child processes with a timeout and bounded output capture
#[derive(Debug, Clone)]
pub struct ProcessToolRunner {
    timeout: Duration,
    max_output_bytes: usize,
}

impl ProcessToolRunner {
    pub fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self { timeout, max_output_bytes }
    }
}

/// Read at most `limit` bytes, then drain the rest so the child never blocks on a full pipe
async fn read_capped<R: AsyncRead + Unpin>(reader: Option<R>, limit: usize) -> std::io::Result<(Vec<u8>, bool)> {
    let mut buffer = Vec::new();
    let reader = match reader {
        Some(reader) => reader,
        None => return Ok((buffer, false)),
    };

    let mut limited = reader.take(limit as u64);
    limited.read_to_end(&mut buffer).await?;
    let mut rest = limited.into_inner();
    let drained = tokio::io::copy(&mut rest, &mut tokio::io::sink()).await?;

    Ok((buffer, drained > 0))
}

#[async_trait]
impl ToolRunner for ProcessToolRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ToolError> {
        debug!("Running: {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ToolError::NotFound { program: program.to_string() },
                _ => ToolError::Io { program: program.to_string(), reason: e.to_string() },
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.max_output_bytes;

        let completion = async {
            let (out, err, status) = tokio::join!(
                read_capped(stdout, limit),
                read_capped(stderr, limit),
                child.wait()
            );
            Ok::<_, std::io::Error>((out?, err?, status?))
        };

        let result = tokio::time::timeout(self.timeout, completion).await;
        let ((stdout, stdout_truncated), (stderr, stderr_truncated), status) = match result {
            Ok(Ok(finished)) => finished,
            Ok(Err(e)) => {
                return Err(ToolError::Io { program: program.to_string(), reason: e.to_string() });
            }
            Err(_) => {
                let _ = child.kill().await;
                return Err(ToolError::TimedOut { program: program.to_string(), timeout: self.timeout });
            }
        };

        let truncated = stdout_truncated || stderr_truncated;
        if truncated {
            debug!("{} output exceeded {} bytes and was truncated", program, limit);
        }

        Ok(ToolOutput {
            success: status.success(),
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            truncated,
        })
    }
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "libav",
        "libsw",
        "libpostproc",
        "Input #",
        "Metadata:",
        "Duration:",
        "Chapter",
        "Stream #",
        "title",
        "BPS",
        "DURATION",
        "NUMBER_OF",
        "_STATISTICS",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !noise_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
