//! Core domain for the Placement Insights pipeline.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and error type used throughout the workspace. Infrastructure crates
//! implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RunId`, `ModelName`, `EmbeddingModelName`) |
//! | [`types`] | Pipeline state, stage identities, stage outputs, generation settings |
//! | [`errors`] | Error and retry-policy types |
//! | [`ports`] | Traits implemented by infrastructure (`LlmProvider`, `Embedder`, `HistoricalSource`) |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{HistoryError, LlmError, PipelineError, RetryPolicy};
pub use identifiers::{EmbeddingModelName, ModelName, RunId};
pub use ports::{Embedder, HistoricalSource, LlmProvider};
pub use types::{
    GenerationConfig, HarmBlockThreshold, HarmCategory, ModelReply, PipelineState,
    SafetySetting, StageKind, StageOutput, WORKFLOW_COMPLETE,
};
