/*!
 * Pacing of translation requests.
 */

use std::fmt::Debug;
use std::time::Duration;
use async_trait::async_trait;

/// Waited on before every translation request
#[async_trait]
pub trait RateLimiter: Send + Sync + Debug {
    async fn wait(&self);
}

/// Sleeps a fixed amount of time before each request
#[derive(Debug, Clone)]
pub struct FixedDelayRateLimiter {
    delay: Duration,
}

impl FixedDelayRateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }
}

#[async_trait]
impl RateLimiter for FixedDelayRateLimiter {
    async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RateLimiter for NoDelay {
    async fn wait(&self) {}
}
