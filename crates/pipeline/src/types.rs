//! Shared value types for the placement pipeline.
//!
//! [`PipelineState`] is the single record threaded through the six stages.
//! Its derived fields hold typed [`StageOutput`] values; they are flattened to
//! plain text only when fed into a later prompt or serialized for the response.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::PipelineError;

// ---------------------------------------------------------------------------
// Stage identities
// ---------------------------------------------------------------------------

/// Log entry appended after the final stage has written its output.
pub const WORKFLOW_COMPLETE: &str = "✅ Workflow Complete!";

/// The six pipeline stages, in execution order.
///
/// The derived `Ord` follows pipeline order, so `a < b` means `a` runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Consolidates raw records into a structured summary.
    DataCollector,
    /// Derives root-cause insights from the structured summary.
    InsightSynthesizer,
    /// Contrasts the insights with historical data.
    TrendComparator,
    /// Proposes three concrete actions.
    ActionRecommender,
    /// Composes the final report.
    ReportGenerator,
    /// Drafts stakeholder communications.
    StakeholderNotifier,
}

impl StageKind {
    /// All stages in execution order.
    pub const ALL: [StageKind; 6] = [
        StageKind::DataCollector,
        StageKind::InsightSynthesizer,
        StageKind::TrendComparator,
        StageKind::ActionRecommender,
        StageKind::ReportGenerator,
        StageKind::StakeholderNotifier,
    ];

    /// 1-based position of this stage in the pipeline.
    pub fn ordinal(self) -> usize {
        self as usize + 1
    }

    /// Human-readable stage name.
    pub fn name(self) -> &'static str {
        match self {
            StageKind::DataCollector => "Data Collector",
            StageKind::InsightSynthesizer => "Insight Synthesizer",
            StageKind::TrendComparator => "Trend Comparator",
            StageKind::ActionRecommender => "Action Recommender",
            StageKind::ReportGenerator => "Report Generator",
            StageKind::StakeholderNotifier => "Stakeholder Notifier",
        }
    }

    /// Name of the state field this stage writes, as it appears in the response.
    pub fn field(self) -> &'static str {
        match self {
            StageKind::DataCollector => "structured_data",
            StageKind::InsightSynthesizer => "insights",
            StageKind::TrendComparator => "trend_comparison",
            StageKind::ActionRecommender => "recommendations",
            StageKind::ReportGenerator => "report",
            StageKind::StakeholderNotifier => "notifications",
        }
    }

    /// The "starting" log entry appended before the stage calls the model.
    pub fn start_message(self) -> &'static str {
        match self {
            StageKind::DataCollector => "▶️ Agent 1: Data Collector - Processing all data files...",
            StageKind::InsightSynthesizer => {
                "▶️ Agent 2: Insight Synthesizer - Generating key insights..."
            }
            StageKind::TrendComparator => {
                "▶️ Agent 3: Trend Comparator - Comparing with historical data..."
            }
            StageKind::ActionRecommender => "▶️ Agent 4: Action Recommender - Suggesting actions...",
            StageKind::ReportGenerator => "▶️ Agent 5: Report Generator - Compiling final report...",
            StageKind::StakeholderNotifier => {
                "▶️ Agent 6: Stakeholder Notifier - Drafting communications..."
            }
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Stage output
// ---------------------------------------------------------------------------

/// The value a stage writes into its field.
///
/// Degraded variants carry the failure in typed form; [`Display`] renders the
/// text that downstream prompts and API clients see.
///
/// [`Display`]: std::fmt::Display
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// The model returned usable text.
    Generated(String),
    /// The provider refused to generate content for the prompt.
    Blocked {
        /// Provider feedback describing the block.
        reason: String,
    },
    /// Every attempt failed.
    Failed {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Description of the last failure.
        error: String,
    },
    /// A fixed degraded message produced without calling the model.
    Fallback(String),
}

impl StageOutput {
    /// Returns `true` unless the model produced this output normally.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, StageOutput::Generated(_))
    }

    /// Returns the flattened text of this output.
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for StageOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageOutput::Generated(text) | StageOutput::Fallback(text) => f.write_str(text),
            StageOutput::Blocked { reason } => write!(f, "Response blocked: {reason}"),
            StageOutput::Failed { attempts, error } => {
                write!(f, "Failed after {attempts} attempts: {error}")
            }
        }
    }
}

impl Serialize for StageOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Pipeline state
// ---------------------------------------------------------------------------

/// The record threaded through every stage of one pipeline run.
///
/// Derived fields start empty and are written exactly once, in pipeline
/// order, through [`PipelineState::record`]. The log is append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    raw_input: String,
    structured_data: Option<StageOutput>,
    insights: Option<StageOutput>,
    trend_comparison: Option<StageOutput>,
    recommendations: Option<StageOutput>,
    report: Option<StageOutput>,
    notifications: Option<StageOutput>,
    log: Vec<String>,
}

impl PipelineState {
    /// Creates a fresh state for `raw_input`.
    ///
    /// Returns [`PipelineError::EmptyInput`] if the input is empty or blank.
    pub fn new(raw_input: impl Into<String>) -> Result<Self, PipelineError> {
        let raw_input = raw_input.into();
        if raw_input.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        Ok(Self {
            raw_input,
            structured_data: None,
            insights: None,
            trend_comparison: None,
            recommendations: None,
            report: None,
            notifications: None,
            log: Vec::new(),
        })
    }

    /// The user-supplied source text.
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// The output recorded for `stage`, if the stage has run.
    pub fn output(&self, stage: StageKind) -> Option<&StageOutput> {
        match stage {
            StageKind::DataCollector => self.structured_data.as_ref(),
            StageKind::InsightSynthesizer => self.insights.as_ref(),
            StageKind::TrendComparator => self.trend_comparison.as_ref(),
            StageKind::ActionRecommender => self.recommendations.as_ref(),
            StageKind::ReportGenerator => self.report.as_ref(),
            StageKind::StakeholderNotifier => self.notifications.as_ref(),
        }
    }

    /// The flattened text recorded for `stage`, or an empty string if unset.
    pub fn text(&self, stage: StageKind) -> String {
        self.output(stage).map(StageOutput::as_text).unwrap_or_default()
    }

    /// Writes the output of `stage`.
    ///
    /// Fails if the field is already set or if any predecessor field is
    /// still empty.
    pub fn record(&mut self, stage: StageKind, output: StageOutput) -> Result<(), PipelineError> {
        if self.output(stage).is_some() {
            return Err(PipelineError::FieldAlreadySet { stage });
        }
        if let Some(missing) = StageKind::ALL
            .into_iter()
            .take_while(|s| *s < stage)
            .find(|s| self.output(*s).is_none())
        {
            return Err(PipelineError::OutOfOrder { stage, missing });
        }

        tracing::debug!(stage = %stage, degraded = output.is_degraded(), "stage output recorded");

        let slot = match stage {
            StageKind::DataCollector => &mut self.structured_data,
            StageKind::InsightSynthesizer => &mut self.insights,
            StageKind::TrendComparator => &mut self.trend_comparison,
            StageKind::ActionRecommender => &mut self.recommendations,
            StageKind::ReportGenerator => &mut self.report,
            StageKind::StakeholderNotifier => &mut self.notifications,
        };
        *slot = Some(output);
        Ok(())
    }

    /// Appends an entry to the run log.
    pub fn push_log(&mut self, entry: impl Into<String>) {
        self.log.push(entry.into());
    }

    /// The run log, oldest entry first.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Returns `true` once every stage has recorded its output.
    pub fn is_complete(&self) -> bool {
        StageKind::ALL.into_iter().all(|s| self.output(s).is_some())
    }
}

/// Serializes to the flat JSON shape returned by `/analyze`: every field is a
/// string (`""` while unset) and the log is `workflow_log`.
impl Serialize for PipelineState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("PipelineState", 8)?;
        s.serialize_field("raw_data_text", &self.raw_input)?;
        for stage in StageKind::ALL {
            s.serialize_field(stage.field(), &self.text(stage))?;
        }
        s.serialize_field("workflow_log", &self.log)?;
        s.end()
    }
}

// ---------------------------------------------------------------------------
// Model replies and generation settings
// ---------------------------------------------------------------------------

/// A single, well-formed reply from a text-generation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Generated text.
    Text(String),
    /// The provider blocked the prompt or the candidate; the string is its feedback.
    Blocked(String),
    /// The reply carried no text and no block feedback.
    Empty,
}

/// Harm categories accepted by the provider's safety configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Blocking threshold for one harm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// One entry of the safety configuration sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// Safety configuration that permits all four harm categories.
    pub fn permissive() -> Vec<SafetySetting> {
        [
            HarmCategory::HateSpeech,
            HarmCategory::Harassment,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: HarmBlockThreshold::BlockNone,
        })
        .collect()
    }
}

/// Fixed sampling parameters applied to every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub safety_settings: Vec<SafetySetting>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
            safety_settings: SafetySetting::permissive(),
        }
    }
}
