//! Port traits implemented by infrastructure crates.
//!
//! The orchestration layer depends only on these traits, so tests can drive
//! the whole pipeline with in-memory stubs.

use async_trait::async_trait;

use crate::{GenerationConfig, HistoryError, LlmError, ModelReply};

/// A text-generation model.
///
/// Implementations perform exactly one call per invocation; retrying is the
/// caller's job.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generates a reply for `prompt` using the given sampling and safety settings.
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<ModelReply, LlmError>;
}

/// A text-embedding model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds every input text. The result has one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Supplies the historical corpus consulted by the trend comparison stage.
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    /// Loads the full corpus. A missing corpus is `Ok(None)`, not an error.
    async fn load(&self) -> Result<Option<String>, HistoryError>;
}
