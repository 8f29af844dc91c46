//! Timed pauses between provider calls.
//!
//! The pipeline never sleeps directly; it asks a [`Sleeper`], so tests can
//! record the requested pauses instead of waiting them out.

use std::time::Duration;

use async_trait::async_trait;
use leadmap_core::AppConfig;

/// Delay durations applied by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Wait before submitting a page token. Tokens are rejected until they
    /// activate on the provider side.
    pub inter_page: Duration,
    /// Wait after every detail fetch.
    pub inter_item: Duration,
    /// Wait between consecutive queries of a run.
    pub inter_query: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            inter_page: Duration::from_millis(2000),
            inter_item: Duration::from_millis(200),
            inter_query: Duration::from_millis(1000),
        }
    }
}

impl PacingPolicy {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            inter_page: Duration::from_millis(config.page_token_delay_ms),
            inter_item: Duration::from_millis(config.detail_delay_ms),
            inter_query: Duration::from_millis(config.query_delay_ms),
        }
    }

    /// No pauses at all.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            inter_page: Duration::ZERO,
            inter_item: Duration::ZERO,
            inter_query: Duration::ZERO,
        }
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tokio::time::sleep(duration).await;
    }
}
