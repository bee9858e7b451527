use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{error, warn, debug};

// @module: Subtitle documents as ordered opaque entries, and chunking

// @const: SRT timestamp range line
static TIMESTAMP_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}:\d{2}:\d{2}[,.]\d{3}\s*-->\s*\d{1,2}:\d{2}:\d{2}[,.]\d{3}$").unwrap()
});

// @const: Sequence number line
static SEQUENCE_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

// @const: One or more blank (or whitespace-only) lines
static ENTRY_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").unwrap());

/// Separator placed between entries when a document or chunk is serialized
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// Whether a line is a bare sequence number
pub fn is_sequence_line(line: &str) -> bool {
    SEQUENCE_LINE_REGEX.is_match(line.trim())
}

/// Whether a line is a `start --> end` timestamp range
pub fn is_timestamp_line(line: &str) -> bool {
    TIMESTAMP_LINE_REGEX.is_match(line.trim())
}

// @struct: One blank-line-delimited block, kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    block: String,
}

impl SubtitleEntry {
    pub fn new(block: impl Into<String>) -> Self {
        SubtitleEntry { block: block.into() }
    }

    /// The block exactly as it appeared in the source
    pub fn as_str(&self) -> &str {
        &self.block
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.block.chars().count()
    }

    /// The first timestamp range line of the block, if any
    pub fn timestamp_line(&self) -> Option<&str> {
        self.block.lines().find(|line| is_timestamp_line(line))
    }

    /// Lines that carry spoken text rather than numbering or timing
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.block
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !is_sequence_line(trimmed) && !is_timestamp_line(trimmed)
            })
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.block)
    }
}

/// A contiguous run of entries sent to the translation service together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    entries: Vec<SubtitleEntry>,
}

impl Chunk {
    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialized form: entries separated by one blank line
    pub fn text(&self) -> String {
        join_entries(&self.entries)
    }

    /// Serialized length in characters
    pub fn char_len(&self) -> usize {
        serialized_len(&self.entries)
    }
}

fn join_entries(entries: &[SubtitleEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.as_str())
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

fn serialized_len(entries: &[SubtitleEntry]) -> usize {
    let content: usize = entries.iter().map(|entry| entry.char_len()).sum();
    content + ENTRY_SEPARATOR.len() * entries.len().saturating_sub(1)
}

/// Ordered sequence of subtitle entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleDocument {
    /// Entries in source order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleDocument {
    /// Split subtitle text into entries on blank lines
    pub fn parse(content: &str) -> Self {
        let normalized = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");

        let entries = ENTRY_SEPARATOR_REGEX
            .split(&normalized)
            .map(|block| block.trim_start_matches('\n').trim_end())
            .filter(|block| !block.trim().is_empty())
            .map(SubtitleEntry::new)
            .collect();

        SubtitleDocument { entries }
    }

    /// Read and split a subtitle file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialized length in characters
    pub fn char_len(&self) -> usize {
        serialized_len(&self.entries)
    }

    /// Split entries into chunks for translation
    ///
    /// Entries are accumulated greedily. The running chunk is closed as soon as
    /// the next entry would push it past `max_chunk_chars`; an entry that is
    /// larger than the limit on its own ends up alone in its chunk. Entries are
    /// never split, reordered or dropped.
    pub fn split_into_chunks(&self, max_chunk_chars: usize) -> Vec<Chunk> {
        if self.entries.is_empty() {
            warn!("No subtitle entries to split into chunks");
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut current: Vec<SubtitleEntry> = Vec::new();
        let mut current_size = 0;

        for entry in &self.entries {
            let entry_size = entry.char_len();
            let appended_size = if current.is_empty() {
                entry_size
            } else {
                current_size + ENTRY_SEPARATOR.len() + entry_size
            };

            if appended_size > max_chunk_chars && !current.is_empty() {
                chunks.push(Chunk { entries: std::mem::take(&mut current) });
                current_size = 0;
            }

            if current.is_empty() {
                if entry_size > max_chunk_chars {
                    debug!("Entry of {} chars exceeds the {} char limit, placing it in its own chunk",
                           entry_size, max_chunk_chars);
                }
                current_size = entry_size;
            } else {
                current_size += ENTRY_SEPARATOR.len() + entry_size;
            }
            current.push(entry.clone());
        }

        if !current.is_empty() {
            chunks.push(Chunk { entries: current });
        }

        // Verify that all entries have been included in the chunks
        let total_chunked_entries: usize = chunks.iter().map(|chunk| chunk.len()).sum();
        if total_chunked_entries != self.entries.len() {
            error!("Lost entries during chunking! Original: {}, After chunking: {}",
                   self.entries.len(), total_chunked_entries);
        } else if log::max_level() >= log::LevelFilter::Debug {
            for (i, chunk) in chunks.iter().enumerate() {
                debug!("Chunk {}: {} entries, {} chars", i + 1, chunk.len(), chunk.char_len());
            }
        }

        chunks
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&join_entries(&self.entries))
    }
}
