//! The pipeline driver.

use std::sync::Arc;

use pipeline::{HistoricalSource, PipelineError, PipelineState, RunId, WORKFLOW_COMPLETE};
use tracing::Instrument;

use crate::gateway::LlmGateway;
use crate::stages::{
    ActionRecommender, DataCollector, InsightSynthesizer, ReportGenerator, RetrievalSettings,
    Stage, StakeholderNotifier, TrendComparator,
};

/// Runs the six stages, in order, over a fresh [`PipelineState`].
///
/// The executor is immutable after construction and can be shared between
/// concurrent requests behind an `Arc`; each run owns its own state.
pub struct PipelineExecutor {
    gateway: LlmGateway,
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineExecutor {
    /// Creates the standard pipeline. `retrieval` enables embedding-based
    /// selection of historical context for the trend comparison stage.
    pub fn new(
        gateway: LlmGateway,
        history: Arc<dyn HistoricalSource>,
        retrieval: Option<RetrievalSettings>,
    ) -> Self {
        let mut trend = TrendComparator::new(history);
        if let Some(retrieval) = retrieval {
            trend = trend.with_retrieval(retrieval);
        }

        Self {
            gateway,
            stages: vec![
                Box::new(DataCollector),
                Box::new(InsightSynthesizer),
                Box::new(trend),
                Box::new(ActionRecommender),
                Box::new(ReportGenerator),
                Box::new(StakeholderNotifier),
            ],
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Runs the pipeline over `raw_input`.
    ///
    /// Fails only for blank input or a broken state invariant; model and
    /// corpus failures are recorded in the returned state instead.
    pub async fn run(&self, raw_input: impl Into<String>) -> Result<PipelineState, PipelineError> {
        let mut state = PipelineState::new(raw_input)?;
        let run_id = RunId::new_random();

        let span = tracing::info_span!("pipeline_run", %run_id);
        async {
            tracing::info!(
                stages = self.stages.len(),
                input_chars = state.raw_input().chars().count(),
                "pipeline started"
            );

            for stage in &self.stages {
                let kind = stage.kind();
                let stage_span = tracing::info_span!("stage", stage = %kind, ordinal = kind.ordinal());

                async {
                    state.push_log(kind.start_message());
                    tracing::info!("stage started");

                    let output = stage.produce(&state, &self.gateway).await;
                    let degraded = output.is_degraded();
                    state.record(kind, output)?;

                    if degraded {
                        tracing::warn!("stage finished with degraded output");
                    } else {
                        tracing::info!("stage finished");
                    }

                    if stage.completes_workflow() {
                        state.push_log(WORKFLOW_COMPLETE);
                    }
                    Ok::<(), PipelineError>(())
                }
                .instrument(stage_span)
                .await?;
            }

            tracing::info!("pipeline complete");
            Ok::<PipelineState, PipelineError>(state)
        }
        .instrument(span)
        .await
    }
}
