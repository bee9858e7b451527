use std::time::{Duration, Instant};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use log::error;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider, endpoint_url, status_error, transport_error, truncate_body};
use crate::translation::usage::TokenUsage;

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Set the maximum number of output tokens
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

impl From<&CompletionRequest> for ChatRequest {
    fn from(request: &CompletionRequest) -> Self {
        let messages = vec![
            ChatMessage { role: "system".to_string(), content: request.system.clone() },
            ChatMessage { role: "user".to_string(), content: request.user.clone() },
        ];
        ChatRequest::new(request.model.clone(), messages)
            .temperature(request.temperature)
            .num_predict(request.max_tokens)
    }
}

/// Parse a chat response body, accepting a single object or a JSONL stream
pub fn parse_chat_response(response_text: &str) -> Result<ChatResponse, ProviderError> {
    let parse_error = match serde_json::from_str::<ChatResponse>(response_text) {
        Ok(chat_response) => return Ok(chat_response),
        Err(e) => e,
    };

    // The response might be in JSONL format (streaming response)
    let values: Vec<serde_json::Value> = response_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .collect();

    let last = match values.last() {
        Some(last) => last,
        None => {
            error!("Failed to parse Ollama API chat response: {}. Raw response (first 500 chars): {}",
                   parse_error, truncate_body(response_text));
            return Err(ProviderError::ParseError(format!(
                "Failed to parse Ollama API chat response: {}", parse_error)));
        }
    };

    // Concatenate all the message content pieces
    let content: String = values
        .iter()
        .filter_map(|obj| obj.get("message").and_then(|m| m.get("content")).and_then(|v| v.as_str()))
        .collect();

    let final_state = values
        .iter()
        .rev()
        .find(|v| v.get("done").and_then(|d| d.as_bool()).unwrap_or(false))
        .unwrap_or(last);

    Ok(ChatResponse {
        model: final_state.get("model").and_then(|v| v.as_str()).unwrap_or("unknown").to_string(),
        message: ChatMessage {
            role: "assistant".to_string(),
            content,
        },
        done: true,
        prompt_eval_count: final_state.get("prompt_eval_count").and_then(|v| v.as_u64()),
        eval_count: final_state.get("eval_count").and_then(|v| v.as_u64()),
    })
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>, timeout: Duration) -> Self {
        let url = url.into();
        let base_url = if url.starts_with("http://") || url.starts_with("https://") {
            url.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", url.trim_end_matches('/'))
        };

        Self {
            base_url,
            client: Client::builder()
                .timeout(timeout)
                // Ollama uses HTTP/1.1
                .http1_only()
                .build()
                .unwrap_or_default(),
        }
    }

    /// Chat with the Ollama API
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = endpoint_url(&self.base_url, "api/chat")?;

        let response = self.client.post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("Ollama API", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(status_error(status, &error_text));
        }

        let response_text = response.text().await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to get response text from Ollama API: {}", e)))?;

        parse_chat_response(&response_text)
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = endpoint_url(&self.base_url, "api/version")?;
        let response: serde_json::Value = self.client.get(url)
            .send()
            .await
            .map_err(|e| transport_error("Ollama API", e))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;

        response["version"].as_str()
            .map(|v| v.to_string())
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let started = Instant::now();
        let response = self.chat(&ChatRequest::from(&request)).await?;

        let usage = TokenUsage::from_counts(response.prompt_eval_count, response.eval_count)
            .with_duration(started.elapsed());

        Ok(CompletionResponse {
            text: response.message.content,
            usage,
        })
    }

    async fn test_connection(&self, _model: &str) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
