/*!
 * Error types for the subtrans pipeline.
 *
 * Library-level failures are typed with thiserror; the application layer
 * (controller and CLI) wraps them in anyhow with context.
 */

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to a text-generation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Failures to run an external tool to completion
#[derive(Error, Debug)]
pub enum ToolError {
    /// The executable could not be found
    #[error("{program} not found in PATH")]
    NotFound {
        /// Program that was invoked
        program: String,
    },

    /// The process could not be started or its output could not be read
    #[error("Failed to run {program}: {reason}")]
    Io {
        /// Program that was invoked
        program: String,
        /// Underlying failure
        reason: String,
    },

    /// The process did not finish in time and was killed
    #[error("{program} timed out after {timeout:?}")]
    TimedOut {
        /// Program that was invoked
        program: String,
        /// Timeout that elapsed
        timeout: Duration,
    },
}

/// Errors raised by the extraction engine.
///
/// Per-attempt failures never show up here: they are folded into
/// `AttemptOutcome` and consumed by the strategy chain.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The container could not be inspected
    #[error("Failed to probe {path}: {reason}")]
    Probe {
        /// Video that was probed
        path: PathBuf,
        /// Why probing failed
        reason: String,
    },

    /// The video file does not exist
    #[error("Video file not found: {0}")]
    VideoNotFound(PathBuf),
}

/// Errors that abort the translation of a whole document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The service returned nothing usable for a chunk
    #[error("Empty translation received for chunk {chunk} of {total}")]
    EmptyTranslation {
        /// 1-based chunk number
        chunk: usize,
        /// Total number of chunks
        total: usize,
    },

    /// The subtitle file holds no entries
    #[error("No subtitle entries found in {0}")]
    EmptyDocument(PathBuf),

    /// Translated chunks do not line up with the source chunks
    #[error("Chunk count mismatch: {expected} original vs {actual} translated")]
    Integrity {
        /// Number of source chunks
        expected: usize,
        /// Number of translated chunks
        actual: usize,
    },

    /// Reading the source or writing the output failed
    #[error("File error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Language detection failures; always downgraded to an unknown language
#[derive(Error, Debug)]
pub enum LanguageDetectionError {
    /// The subtitle file could not be read
    #[error("Could not read subtitle sample: {0}")]
    Read(#[from] std::io::Error),

    /// The classification request failed
    #[error("Classification request failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
