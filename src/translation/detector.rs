use std::fmt;
use std::path::Path;
use std::sync::Arc;
use log::{debug, error, info, warn};

use crate::app_config::TranslationConfig;
use crate::errors::LanguageDetectionError;
use crate::language_utils::{self, UNKNOWN_LANGUAGE};
use crate::providers::{CompletionRequest, Provider};
use crate::subtitle_processor::{is_sequence_line, is_timestamp_line};
use crate::translation::prompts;
use crate::translation::usage::TokenUsage;

/// Characters of subtitle text collected before the sample is considered complete
pub const SAMPLE_TARGET_CHARS: usize = 500;

/// Below this many characters the sample is too small to classify
pub const MIN_SAMPLE_CHARS: usize = 50;

/// At most this many characters of the sample are sent to the service
pub const MAX_SAMPLE_SENT_CHARS: usize = 1000;

/// Result of language detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedLanguage {
    /// Language name as returned by the classifier
    Named(String),
    /// Not enough text, or detection failed
    Unknown,
}

impl DetectedLanguage {
    pub fn name(&self) -> &str {
        match self {
            DetectedLanguage::Named(name) => name,
            DetectedLanguage::Unknown => UNKNOWN_LANGUAGE,
        }
    }

    /// Whether this denotes the target language; `Unknown` never matches
    pub fn matches(&self, target_language: &str) -> bool {
        match self {
            DetectedLanguage::Named(name) => language_utils::languages_match(name, target_language),
            DetectedLanguage::Unknown => false,
        }
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Collect spoken text from subtitle content, skipping numbering and timing lines
pub fn build_sample(content: &str) -> String {
    let mut sample = String::new();
    let mut char_count = 0;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_sequence_line(trimmed) || is_timestamp_line(trimmed) {
            continue;
        }

        sample.push_str(line);
        sample.push(' ');
        char_count += line.chars().count();
        if char_count >= SAMPLE_TARGET_CHARS {
            break;
        }
    }

    sample
}

/// Identifies the language of a subtitle file with one classification request
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LanguageDetector {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.1,
            max_tokens: 50,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &TranslationConfig) -> Self {
        Self {
            provider,
            model: config.get_model(),
            temperature: config.common.detection_temperature,
            max_tokens: config.common.detection_max_tokens,
        }
    }

    /// Detect the language of a subtitle file
    ///
    /// Never fails: read and service errors are logged and reported as `Unknown`.
    pub async fn detect(&self, subtitle_path: &Path) -> (DetectedLanguage, TokenUsage) {
        info!("Detecting subtitle language...");
        let result = match tokio::fs::read_to_string(subtitle_path).await {
            Ok(content) => self.detect_text(&content).await,
            Err(e) => Err(LanguageDetectionError::from(e)),
        };
        Self::unknown_on_error(result)
    }

    /// Same as `detect`, for content that has already been read
    pub async fn detect_content(&self, content: &str) -> (DetectedLanguage, TokenUsage) {
        info!("Detecting subtitle language...");
        Self::unknown_on_error(self.detect_text(content).await)
    }

    fn unknown_on_error(result: Result<(DetectedLanguage, TokenUsage), LanguageDetectionError>) -> (DetectedLanguage, TokenUsage) {
        match result {
            Ok(result) => result,
            Err(e) => {
                error!("Error detecting subtitle language: {}", e);
                (DetectedLanguage::Unknown, TokenUsage::new())
            }
        }
    }

    /// Detect the language of subtitle content already in memory
    pub async fn detect_text(&self, content: &str) -> Result<(DetectedLanguage, TokenUsage), LanguageDetectionError> {
        let sample = build_sample(content);
        if sample.trim().chars().count() < MIN_SAMPLE_CHARS {
            warn!("Not enough text to detect language reliably");
            return Ok((DetectedLanguage::Unknown, TokenUsage::new()));
        }

        let sent: String = sample.chars().take(MAX_SAMPLE_SENT_CHARS).collect();
        debug!("Language detection sample ({} chars): {}...",
               sample.chars().count(), sent.chars().take(100).collect::<String>());

        let request = CompletionRequest::new(
            self.model.clone(),
            prompts::LANGUAGE_DETECTOR,
            prompts::detection_user_message(&sent),
        )
        .max_tokens(self.max_tokens)
        .temperature(self.temperature);

        let response = self.provider.complete(request).await?;
        let name = response.text.trim();
        if name.is_empty() {
            warn!("Language detection returned an empty answer");
            return Ok((DetectedLanguage::Unknown, response.usage));
        }

        info!("Detected language: {}", name);
        Ok((DetectedLanguage::Named(name.to_string()), response.usage))
    }
}
