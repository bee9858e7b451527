/*!
 * Provider implementations for text-generation services.
 *
 * This module contains client implementations for the supported services:
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 * - Ollama: Local LLM server
 * - Mock: scripted provider for tests
 *
 * The translation engine only sees the object-safe `Provider` trait, so any
 * client can be injected behind an `Arc<dyn Provider>`.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use anyhow::{Result, anyhow};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::translation::usage::TokenUsage;

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// System prompt
    pub system: String,
    /// User message
    pub user: String,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(model: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
            max_tokens: 1024,
            temperature: 0.3,
        }
    }

    /// Set the maximum number of output tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text returned by a provider together with its token usage
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Token usage of this request
    pub usage: TokenUsage,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation engine.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<CompletionResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError>;

    /// Human readable name used in logs
    fn name(&self) -> &str;
}

/// Create the client for the configured provider
pub fn build_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>> {
    let endpoint = config.get_endpoint();
    let timeout = config.get_timeout();

    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::OpenAI | TranslationProvider::LMStudio => {
            let api_key = config.get_api_key();
            if config.provider == TranslationProvider::OpenAI && api_key.is_empty() {
                return Err(anyhow!("An API key is required for {}", config.provider.display_name()));
            }
            Arc::new(openai::OpenAI::new(api_key, endpoint, timeout)
                .with_name(config.provider.display_name()))
        }
        TranslationProvider::Anthropic => {
            let api_key = config.get_api_key();
            if api_key.is_empty() {
                return Err(anyhow!("An API key is required for {}", config.provider.display_name()));
            }
            Arc::new(anthropic::Anthropic::new(api_key, endpoint, timeout))
        }
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::from_url(endpoint, timeout)),
    };

    Ok(provider)
}

/// Resolve an API path below a base endpoint, keeping the endpoint's own path
pub(crate) fn endpoint_url(base: &str, path: &str) -> Result<Url, ProviderError> {
    let base_url = Url::parse(&format!("{}/", base.trim_end_matches('/')))
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", base, e)))?;
    base_url
        .join(path.trim_start_matches('/'))
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid API path '{}': {}", path, e)))
}

/// Truncate a response body for inclusion in an error message
pub(crate) fn truncate_body(body: &str) -> String {
    if body.chars().count() > 500 {
        body.chars().take(500).collect::<String>()
    } else {
        body.to_string()
    }
}

/// Map an HTTP error status and body to a provider error
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let message = truncate_body(body);
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        code => ProviderError::ApiError { status_code: code, message },
    }
}

/// Map a transport failure to a provider error
pub(crate) fn transport_error(service: &str, e: reqwest::Error) -> ProviderError {
    if e.is_connect() || e.is_timeout() {
        ProviderError::ConnectionError(format!("{}: {}", service, e))
    } else {
        ProviderError::RequestFailed(format!("Failed to send request to {}: {}", service, e))
    }
}

pub mod ollama;
pub mod openai;
pub mod anthropic;
pub mod mock;
