//! The six pipeline stages.
//!
//! Every stage reads predecessor fields from the [`PipelineState`], renders a
//! prompt, and produces one [`StageOutput`]. Logging the start marker and
//! recording the output is the executor's job, so stages never touch the
//! state mutably.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{Embedder, HistoricalSource, PipelineState, StageKind, StageOutput};
use retrieval::{ChunkConfig, RetrievalError, VectorIndex};

use crate::gateway::LlmGateway;
use crate::prompts;

/// Fallback written when no historical corpus exists.
pub const NO_HISTORICAL_DATA: &str =
    "No historical data file found. Unable to perform trend comparison.";

/// One step of the pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Which stage this is; determines the field written and the log marker.
    fn kind(&self) -> StageKind;

    /// Produces this stage's output from the current state.
    async fn produce(&self, state: &PipelineState, gateway: &LlmGateway) -> StageOutput;

    /// Whether the workflow-complete marker follows this stage.
    fn completes_workflow(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------

/// Consolidates raw records into structured data.
pub struct DataCollector;

#[async_trait]
impl Stage for DataCollector {
    fn kind(&self) -> StageKind {
        StageKind::DataCollector
    }

    async fn produce(&self, state: &PipelineState, gateway: &LlmGateway) -> StageOutput {
        gateway
            .generate(&prompts::data_collector(state.raw_input()))
            .await
    }
}

// ---------------------------------------------------------------------------

/// Derives root-cause insights.
pub struct InsightSynthesizer;

#[async_trait]
impl Stage for InsightSynthesizer {
    fn kind(&self) -> StageKind {
        StageKind::InsightSynthesizer
    }

    async fn produce(&self, state: &PipelineState, gateway: &LlmGateway) -> StageOutput {
        let structured = state.text(StageKind::DataCollector);
        gateway
            .generate(&prompts::insight_synthesizer(&structured))
            .await
    }
}

// ---------------------------------------------------------------------------

/// Embedding-based selection of historical context.
#[derive(Clone)]
pub struct RetrievalSettings {
    pub embedder: Arc<dyn Embedder>,
    pub chunking: ChunkConfig,
    pub top_k: usize,
}

impl RetrievalSettings {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            chunking: ChunkConfig::default(),
            top_k: 4,
        }
    }

    /// Builds a fresh index over `corpus` and returns the chunks closest to `question`.
    async fn relevant_context(
        &self,
        corpus: &str,
        question: &str,
    ) -> Result<String, RetrievalError> {
        let index = VectorIndex::build(corpus, self.embedder.as_ref(), &self.chunking).await?;
        let chunks = index
            .query(question, self.embedder.as_ref(), self.top_k)
            .await?;
        tracing::debug!(
            indexed = index.len(),
            selected = chunks.len(),
            "retrieved historical context"
        );
        Ok(chunks.join("\n\n"))
    }
}

/// Compares current insights with the historical corpus.
///
/// Without retrieval the whole corpus goes into the prompt; with retrieval
/// only the top-k chunks most similar to the insights do.
pub struct TrendComparator {
    history: Arc<dyn HistoricalSource>,
    retrieval: Option<RetrievalSettings>,
}

impl TrendComparator {
    pub fn new(history: Arc<dyn HistoricalSource>) -> Self {
        Self {
            history,
            retrieval: None,
        }
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalSettings) -> Self {
        self.retrieval = Some(retrieval);
        self
    }

    fn error_output(message: impl std::fmt::Display) -> StageOutput {
        StageOutput::Fallback(format!(
            "Could not create trend comparison due to an error: {message}"
        ))
    }
}

#[async_trait]
impl Stage for TrendComparator {
    fn kind(&self) -> StageKind {
        StageKind::TrendComparator
    }

    async fn produce(&self, state: &PipelineState, gateway: &LlmGateway) -> StageOutput {
        let corpus = match self.history.load().await {
            Ok(Some(corpus)) => corpus,
            Ok(None) => return StageOutput::Fallback(NO_HISTORICAL_DATA.to_string()),
            Err(err) => {
                tracing::error!(error = %err, "could not load historical data");
                return Self::error_output(err);
            }
        };

        let insights = state.text(StageKind::InsightSynthesizer);

        let context = match &self.retrieval {
            None => corpus,
            Some(retrieval) => match retrieval.relevant_context(&corpus, &insights).await {
                Ok(context) => context,
                Err(err) => {
                    tracing::error!(error = %err, "historical retrieval failed");
                    return Self::error_output(err);
                }
            },
        };

        gateway
            .generate(&prompts::trend_comparator(&context, &insights))
            .await
    }
}

// ---------------------------------------------------------------------------

/// Proposes three concrete actions.
pub struct ActionRecommender;

#[async_trait]
impl Stage for ActionRecommender {
    fn kind(&self) -> StageKind {
        StageKind::ActionRecommender
    }

    async fn produce(&self, state: &PipelineState, gateway: &LlmGateway) -> StageOutput {
        let prompt = prompts::action_recommender(
            &state.text(StageKind::InsightSynthesizer),
            &state.text(StageKind::TrendComparator),
        );
        gateway.generate(&prompt).await
    }
}

// ---------------------------------------------------------------------------

/// Composes the final Markdown report.
pub struct ReportGenerator;

#[async_trait]
impl Stage for ReportGenerator {
    fn kind(&self) -> StageKind {
        StageKind::ReportGenerator
    }

    async fn produce(&self, state: &PipelineState, gateway: &LlmGateway) -> StageOutput {
        let prompt = prompts::report_generator(
            &state.text(StageKind::InsightSynthesizer),
            &state.text(StageKind::TrendComparator),
            &state.text(StageKind::ActionRecommender),
        );
        gateway.generate(&prompt).await
    }
}

// ---------------------------------------------------------------------------

/// Drafts the email and portal notice.
pub struct StakeholderNotifier;

#[async_trait]
impl Stage for StakeholderNotifier {
    fn kind(&self) -> StageKind {
        StageKind::StakeholderNotifier
    }

    async fn produce(&self, state: &PipelineState, gateway: &LlmGateway) -> StageOutput {
        let report = state.text(StageKind::ReportGenerator);
        gateway
            .generate(&prompts::stakeholder_notifier(&report))
            .await
    }

    fn completes_workflow(&self) -> bool {
        true
    }
}
