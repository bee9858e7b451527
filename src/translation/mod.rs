/*!
 * Subtitle translation.
 *
 * - `detector`: language identification of an extracted subtitle
 * - `chunk_translator`: one request per chunk
 * - `engine`: detect, chunk, translate and reassemble a whole file
 * - `prompts`: system prompts and user message templates
 * - `rate_limit`: pacing between requests
 * - `usage`: token accounting
 */

pub mod chunk_translator;
pub mod detector;
pub mod engine;
pub mod prompts;
pub mod rate_limit;
pub mod usage;

pub use chunk_translator::{ChunkTranslation, ChunkTranslator};
pub use detector::{DetectedLanguage, LanguageDetector};
pub use engine::{TranslationEngine, TranslationOutcome};
pub use rate_limit::{FixedDelayRateLimiter, NoDelay, RateLimiter};
pub use usage::TokenUsage;
