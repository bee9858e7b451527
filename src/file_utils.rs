use anyhow::{Result, Context};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use std::fs::OpenOptions;
use chrono::Local;
use tempfile::NamedTempFile;
use log::debug;

// @module: File and directory utilities

// @const: Video extensions picked up in directory mode
pub const VIDEO_EXTENSIONS: [&str; 8] = ["mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m4v"];

// @const: Infix of the intermediate extraction artifact
pub const EXTRACTED_INFIX: &str = "extracted";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @checks: File exists and has content
    pub fn is_non_empty_file<P: AsRef<Path>>(path: P) -> bool {
        fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Sibling of the video named `<stem>.<infix>.<extension>`
    pub fn generate_output_path<P: AsRef<Path>>(video_file: P, infix: &str, extension: &str) -> PathBuf {
        let video_file = video_file.as_ref();

        // Get the file stem (filename without extension)
        let stem = video_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(infix);
        output_filename.push('.');
        output_filename.push_str(extension);

        match video_file.parent() {
            Some(dir) => dir.join(output_filename),
            None => PathBuf::from(output_filename),
        }
    }

    // @generates: `<stem>.extracted.srt` next to the video
    pub fn extraction_output_path<P: AsRef<Path>>(video_file: P) -> PathBuf {
        Self::generate_output_path(video_file, EXTRACTED_INFIX, "srt")
    }

    // @generates: `<stem>.extracted.<ext>` next to the video
    pub fn extraction_intermediate_path<P: AsRef<Path>>(video_file: P, extension: &str) -> PathBuf {
        Self::generate_output_path(video_file, EXTRACTED_INFIX, extension)
    }

    /// Delete a file, treating a missing file as success
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> io::Result<()> {
        match fs::remove_file(path.as_ref()) {
            Ok(()) => {
                debug!("Removed {:?}", path.as_ref());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Whether the path has one of the supported video extensions
    pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                VIDEO_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Find video files in a directory tree, sorted by path
    pub fn find_video_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_video_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Write a string to a file through a temporary sibling and a rename
    ///
    /// Readers never observe a partially written file.
    pub fn write_atomically<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.flush()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
