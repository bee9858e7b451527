/*!
 * Common test utilities for the subtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// Re-export the fake tools module
pub mod fake_tools;

/// Route library logs to the test output; safe to call from every test
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a placeholder video; the fakes never read its bytes
pub fn create_test_video(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, "not really a video")
}

/// Two English entries, long enough for language detection
pub const ENGLISH_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
Good evening and welcome back.

2
00:00:05,000 --> 00:00:09,500
Tonight: trains and rivers.
";

/// Two French entries, long enough for language detection
pub const FRENCH_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
Bonsoir à tous et bienvenue dans l'émission.

2
00:00:05,000 --> 00:00:09,500
Ce soir, nous parlons des trains et des rivières.
";

/// Build an SRT document with `count` numbered entries
pub fn numbered_srt(count: usize) -> String {
    (1..=count)
        .map(|i| format!("{}\n00:00:{:02},000 --> 00:00:{:02},500\nLine number {} of the test.\n", i, i % 60, i % 60, i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Timestamp lines of an SRT document, in order
pub fn timestamp_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| line.contains(" --> "))
        .map(|line| line.to_string())
        .collect()
}
