//! The LLM gateway: every stage's model call goes through here.
//!
//! The gateway owns the fixed [`GenerationConfig`] and the bounded retry loop.
//! It never returns an error: failures become [`StageOutput`] values so the
//! pipeline always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use pipeline::{GenerationConfig, LlmProvider, ModelReply, RetryPolicy, StageOutput};

/// Attempt budget and back-off for model calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Total attempts per call. Zero is treated as one.
    pub attempts: u32,
    /// Delay between attempts when the error does not request its own.
    pub backoff: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Wraps an [`LlmProvider`] with fixed generation settings and retries.
#[derive(Clone)]
pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
    retry: RetrySettings,
}

impl LlmGateway {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            config: GenerationConfig::default(),
            retry: RetrySettings::default(),
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn retry_settings(&self) -> RetrySettings {
        self.retry
    }

    /// Generates text for `prompt`.
    ///
    /// - usable text → [`StageOutput::Generated`]
    /// - safety block → [`StageOutput::Blocked`], not retried
    /// - empty reply or retryable error → retried until the budget is spent
    /// - non-retryable error or exhausted budget → [`StageOutput::Failed`]
    pub async fn generate(&self, prompt: &str) -> StageOutput {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let requested_delay = match self.provider.generate(prompt, &self.config).await {
                Ok(ModelReply::Text(text)) if !text.trim().is_empty() => {
                    tracing::debug!(attempt, chars = text.chars().count(), "model returned text");
                    return StageOutput::Generated(text);
                }
                Ok(ModelReply::Blocked(reason)) => {
                    tracing::warn!(attempt, %reason, "model response blocked");
                    return StageOutput::Blocked { reason };
                }
                Ok(_) => {
                    tracing::warn!(attempt, attempts, "model returned an empty response");
                    last_error = "model returned an empty response".to_string();
                    None
                }
                Err(err) => {
                    tracing::warn!(attempt, attempts, error = %err, "LLM call failed");
                    last_error = err.to_string();
                    match err.retry_policy() {
                        RetryPolicy::NonRetryable => {
                            return StageOutput::Failed {
                                attempts: attempt,
                                error: last_error,
                            };
                        }
                        RetryPolicy::Retryable { after } => after,
                    }
                }
            };

            if attempt < attempts {
                let delay = requested_delay.unwrap_or(self.retry.backoff);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        tracing::error!(attempts, error = %last_error, "LLM call failed on every attempt");
        StageOutput::Failed {
            attempts,
            error: last_error,
        }
    }
}
