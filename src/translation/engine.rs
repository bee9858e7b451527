use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{info, warn};

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::Provider;
use crate::subtitle_processor::{SubtitleDocument, ENTRY_SEPARATOR};
use crate::translation::chunk_translator::ChunkTranslator;
use crate::translation::detector::{DetectedLanguage, LanguageDetector};
use crate::translation::rate_limit::RateLimiter;
use crate::translation::usage::TokenUsage;

/// How a translation request ended
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    /// The translated subtitle was written to `path`
    Translated {
        path: PathBuf,
        usage: TokenUsage,
    },
    /// The subtitle is already in the target language
    Skipped {
        detected: DetectedLanguage,
        usage: TokenUsage,
    },
}

impl TranslationOutcome {
    pub fn usage(&self) -> &TokenUsage {
        match self {
            TranslationOutcome::Translated { usage, .. } => usage,
            TranslationOutcome::Skipped { usage, .. } => usage,
        }
    }
}

/// Output path of a translation: `<stem>.<code>.srt` next to the video
pub fn translated_output_path(video_path: &Path, target_language: &str) -> PathBuf {
    let code = language_utils::language_code_for(target_language);
    FileManager::generate_output_path(video_path, &code, "srt")
}

/// Join translated chunks in order, refusing to continue if any chunk is missing
pub fn reassemble(expected_chunks: usize, translated: &[String]) -> Result<String, TranslationError> {
    if translated.len() != expected_chunks {
        return Err(TranslationError::Integrity {
            expected: expected_chunks,
            actual: translated.len(),
        });
    }

    let mut content = translated
        .iter()
        .map(|chunk| chunk.trim())
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR);
    content.push('\n');
    Ok(content)
}

/// Reassemble and write the translation; nothing is written if a chunk is missing
pub fn write_translation(output_path: &Path, expected_chunks: usize, translated: &[String]) -> Result<(), TranslationError> {
    let output = reassemble(expected_chunks, translated)?;
    FileManager::write_atomically(output_path, &output)
        .map_err(|source| TranslationError::Io { path: output_path.to_path_buf(), source })
}

/// Detects, chunks, translates and reassembles one subtitle file
#[derive(Debug, Clone)]
pub struct TranslationEngine {
    detector: LanguageDetector,
    translator: ChunkTranslator,
    max_chunk_chars: usize,
    skip_same_language: bool,
}

impl TranslationEngine {
    pub fn new(detector: LanguageDetector, translator: ChunkTranslator, max_chunk_chars: usize) -> Self {
        Self {
            detector,
            translator,
            max_chunk_chars,
            skip_same_language: true,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, rate_limiter: Arc<dyn RateLimiter>, config: &Config) -> Self {
        let detector = LanguageDetector::from_config(provider.clone(), &config.translation);
        let translator = ChunkTranslator::from_config(provider, rate_limiter, &config.translation);
        Self::new(detector, translator, config.translation.common.max_chunk_chars)
            .with_skip_same_language(config.skip_same_language)
    }

    /// Whether a subtitle already in the target language is left alone
    pub fn with_skip_same_language(mut self, skip_same_language: bool) -> Self {
        self.skip_same_language = skip_same_language;
        self
    }

    /// Translate the extracted subtitle of `video_path`
    ///
    /// On both the translated and the skipped path the extraction artifact at
    /// `document_path` is deleted. No output file is written on failure.
    pub async fn translate(
        &self,
        document_path: &Path,
        video_path: &Path,
        target_language: &str,
        skip_detection: bool,
    ) -> Result<TranslationOutcome, TranslationError> {
        let content = tokio::fs::read_to_string(document_path)
            .await
            .map_err(|source| TranslationError::Io { path: document_path.to_path_buf(), source })?;

        let document = SubtitleDocument::parse(&content);
        if document.is_empty() {
            warn!("No subtitle entries in {:?}", document_path);
            return Err(TranslationError::EmptyDocument(document_path.to_path_buf()));
        }

        let mut usage = TokenUsage::new();

        if self.skip_same_language && !skip_detection {
            let (detected, detection_usage) = self.detector.detect_content(&content).await;
            usage += detection_usage;

            if detected.matches(target_language) {
                info!("Subtitle is already in {} (detected: {}), skipping translation", target_language, detected);
                remove_artifact(document_path);
                return Ok(TranslationOutcome::Skipped { detected, usage });
            }
            info!("Translating from {} to {}", detected, target_language);
        }

        let chunks = document.split_into_chunks(self.max_chunk_chars);
        info!("Split subtitle into {} chunk(s)", chunks.len());

        let total = chunks.len();
        let mut translated = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let result = self.translator.translate(chunk, index, total, target_language).await?;
            usage += result.usage;
            translated.push(result.text);
        }

        let output_path = translated_output_path(video_path, target_language);
        write_translation(&output_path, total, &translated)?;
        info!("Translation saved to {:?}", output_path);

        remove_artifact(document_path);
        Ok(TranslationOutcome::Translated { path: output_path, usage })
    }
}

fn remove_artifact(path: &Path) {
    if let Err(e) = FileManager::remove_if_exists(path) {
        warn!("Could not delete extracted subtitle {:?}: {}", path, e);
    }
}
