//! Command-line and environment configuration.
//!
//! `.env` is loaded before parsing, so every flag below can also be supplied
//! through the environment variable named in its `env` attribute.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nodes::RetrySettings;
use pipeline::{EmbeddingModelName, GenerationConfig, ModelName, PipelineError};

/// Models tried, in order, when no `--model` is given.
pub const DEFAULT_MODELS: [&str; 5] = [
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-flash-latest",
    "gemini-pro-latest",
    "gemini-2.5-pro",
];

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

#[derive(Debug, Parser)]
#[command(name = "placement-insights")]
#[command(about = "Turns raw placement data into a report through a chain of Gemini prompts")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub retrieval: RetrievalArgs,

    #[command(flatten)]
    pub telemetry: TelemetryArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the analysis endpoint over HTTP
    Serve {
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: String,

        #[arg(long, env = "PORT", default_value_t = 5001)]
        port: u16,
    },
    /// Run the pipeline once and print the final state as JSON
    Analyze {
        /// Input file, or `-` for stdin
        input: String,
    },
    /// List the models that support text generation
    Models,
}

#[derive(Debug, Args)]
pub struct LlmArgs {
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = llm::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Candidate model, tried in the order given
    #[arg(
        long = "model",
        env = "GEMINI_MODELS",
        value_delimiter = ',',
        default_values_t = default_models()
    )]
    pub models: Vec<String>,

    /// Use the first candidate without sending a probe request
    #[arg(long, env = "SKIP_MODEL_PROBE")]
    pub skip_model_probe: bool,

    #[arg(long, env = "LLM_RETRIES", default_value_t = 3)]
    pub retries: u32,

    #[arg(long, env = "LLM_RETRY_BACKOFF_MS", default_value_t = 500)]
    pub retry_backoff_ms: u64,

    #[arg(long, env = "LLM_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f32,
}

impl LlmArgs {
    /// Parses the candidate list, rejecting blank entries.
    pub fn candidate_models(&self) -> Result<Vec<ModelName>, PipelineError> {
        self.models
            .iter()
            .map(|raw| {
                ModelName::new(raw.as_str()).ok_or_else(|| PipelineError::Configuration {
                    message: format!("invalid model name '{raw}'"),
                })
            })
            .collect()
    }

    pub fn retry_settings(&self) -> RetrySettings {
        RetrySettings {
            attempts: self.retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            ..GenerationConfig::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Args)]
pub struct RetrievalArgs {
    /// Historical corpus used by the trend comparison stage
    #[arg(long, env = "HISTORICAL_DATA_PATH", default_value = "historical_data.txt")]
    pub historical_data: PathBuf,

    /// Select historical context by embedding similarity instead of inlining the corpus
    #[arg(long = "retrieval", env = "ENABLE_RETRIEVAL")]
    pub enabled: bool,

    #[arg(long, env = "GEMINI_EMBEDDING_MODEL", default_value = "text-embedding-004")]
    pub embedding_model: String,

    #[arg(long, env = "RETRIEVAL_TOP_K", default_value_t = 4)]
    pub top_k: usize,
}

impl RetrievalArgs {
    pub fn embedding_model(&self) -> Result<EmbeddingModelName, PipelineError> {
        EmbeddingModelName::new(self.embedding_model.as_str()).ok_or_else(|| {
            PipelineError::Configuration {
                message: format!("invalid embedding model name '{}'", self.embedding_model),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Args)]
pub struct TelemetryArgs {
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// OTLP/gRPC collector, e.g. `http://localhost:4317`
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}
