/*!
 * Token usage accounting.
 *
 * Every service call reports a `TokenUsage`; callers merge them into a
 * per-invocation total. There is no process-wide accumulator.
 */

use std::ops::AddAssign;
use std::time::Duration;

/// Token usage for one or more service requests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of requests that contributed to these counts
    pub requests: u32,

    /// Total time spent waiting on the service
    pub api_duration: Duration,
}

impl TokenUsage {
    /// Create an empty usage record
    pub fn new() -> Self {
        Self::default()
    }

    /// Usage of a single request
    pub fn from_counts(prompt_tokens: Option<u64>, completion_tokens: Option<u64>) -> Self {
        let mut usage = Self { requests: 1, ..Self::default() };
        usage.add_token_usage(prompt_tokens, completion_tokens);
        usage
    }

    /// Add token counts reported by a provider; missing counts are ignored
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Attach the time the request took
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.api_duration = duration;
        self
    }

    /// Merge another usage record into this one
    pub fn merge(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        self.requests += other.requests;
        self.api_duration += other.api_duration;
    }

    /// Estimated cost in dollars at the given per-1K-token prices
    pub fn estimated_cost(&self, input_cost_per_1k: f64, output_cost_per_1k: f64) -> f64 {
        (self.prompt_tokens as f64 / 1000.0) * input_cost_per_1k
            + (self.completion_tokens as f64 / 1000.0) * output_cost_per_1k
    }

    /// Tokens processed per minute of API time
    pub fn tokens_per_minute(&self) -> f64 {
        let duration_minutes = self.api_duration.as_secs_f64() / 60.0;
        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a one-line summary of token usage
    pub fn summary(&self, input_cost_per_1k: f64, output_cost_per_1k: f64) -> String {
        format!(
            "{} requests, {} prompt + {} completion = {} tokens, {:.1}s API time, est. ${:.4}",
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.api_duration.as_secs_f64(),
            self.estimated_cost(input_cost_per_1k, output_cost_per_1k)
        )
    }
}

impl AddAssign<&TokenUsage> for TokenUsage {
    fn add_assign(&mut self, other: &TokenUsage) {
        self.merge(other);
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: TokenUsage) {
        self.merge(&other);
    }
}
