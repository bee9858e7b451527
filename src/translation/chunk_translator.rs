use std::sync::Arc;
use std::time::Instant;
use log::{debug, info, warn, error};

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::providers::{CompletionRequest, Provider};
use crate::subtitle_processor::Chunk;
use crate::translation::prompts;
use crate::translation::rate_limit::RateLimiter;
use crate::translation::usage::TokenUsage;

/// A translation shorter than this fraction of its source is logged as suspicious
pub const SHORT_TRANSLATION_RATIO: f64 = 0.3;

/// Translated text of one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkTranslation {
    pub text: String,
    pub usage: TokenUsage,
}

/// Sends one chunk at a time to the translation service
#[derive(Debug, Clone)]
pub struct ChunkTranslator {
    provider: Arc<dyn Provider>,
    rate_limiter: Arc<dyn RateLimiter>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChunkTranslator {
    pub fn new(provider: Arc<dyn Provider>, rate_limiter: Arc<dyn RateLimiter>, model: impl Into<String>) -> Self {
        Self {
            provider,
            rate_limiter,
            model: model.into(),
            temperature: 0.3,
            max_tokens: 8000,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, rate_limiter: Arc<dyn RateLimiter>, config: &TranslationConfig) -> Self {
        Self {
            provider,
            rate_limiter,
            model: config.get_model(),
            temperature: config.common.temperature,
            max_tokens: config.common.max_tokens,
        }
    }

    /// Translate one chunk; `index` is 0-based
    pub async fn translate(&self, chunk: &Chunk, index: usize, total: usize, target_language: &str) -> Result<ChunkTranslation, TranslationError> {
        self.rate_limiter.wait().await;

        let source = chunk.text();
        let request = CompletionRequest::new(
            self.model.clone(),
            prompts::chunk_system_prompt(target_language, index, total),
            prompts::chunk_user_message(&source),
        )
        .max_tokens(self.max_tokens)
        .temperature(self.temperature);

        info!("Translating chunk {}/{}...", index + 1, total);
        let started = Instant::now();
        let response = self.provider.complete(request).await.map_err(|e| {
            error!("Error translating chunk {}: {}", index + 1, e);
            TranslationError::from(e)
        })?;

        if response.text.trim().is_empty() {
            error!("Empty translation received for chunk {}", index + 1);
            return Err(TranslationError::EmptyTranslation { chunk: index + 1, total });
        }

        let source_len = source.chars().count();
        let translated_len = response.text.chars().count();
        info!("Chunk {}/{} completed in {}ms", index + 1, total, started.elapsed().as_millis());
        debug!("Tokens used: {}, original size: {} chars, translated size: {} chars",
               response.usage.total_tokens, source_len, translated_len);

        if (translated_len as f64) < source_len as f64 * SHORT_TRANSLATION_RATIO {
            warn!("Translation seems unusually short for chunk {} ({} vs {} chars)", index + 1, translated_len, source_len);
        }

        Ok(ChunkTranslation {
            text: response.text,
            usage: response.usage,
        })
    }
}
