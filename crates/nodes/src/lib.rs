//! Placement Insights pipeline stages and executor.
//!
//! This crate provides the six stage implementations (Data Collector through
//! Stakeholder Notifier), the [`LlmGateway`] that wraps every model call with
//! fixed generation settings and bounded retries, and the [`PipelineExecutor`]
//! that drives the stages in order.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between the domain types in
//! the [`pipeline`] crate and the infrastructure traits (LLM, embeddings,
//! historical corpus). They contain no transport code.
//!
//! ## Failure handling
//!
//! Nothing a stage does can abort a run. Exhausted retries, safety blocks,
//! a missing corpus, and retrieval errors all become [`pipeline::StageOutput`]
//! values, which downstream stages receive as text.

pub mod executor;
pub mod gateway;
pub mod prompts;
pub mod stages;

pub use executor::PipelineExecutor;
pub use gateway::{LlmGateway, RetrySettings};
pub use stages::{RetrievalSettings, Stage, TrendComparator, NO_HISTORICAL_DATA};
