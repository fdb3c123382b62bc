//! Placement Insights entry point.
//!
//! This binary is the composition root for the whole system:
//!
//! 1. **Parse configuration**: load `.env`, then flags and environment via clap.
//! 2. **Wire observability**: `tracing-subscriber` with a human or JSON layer
//!    and an optional OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: a `GeminiProvider` (probing the candidate
//!    models unless told not to), the historical corpus source, and optional
//!    embedding retrieval, all injected into the `PipelineExecutor`.
//! 4. **Select trigger mode**:
//!    - `serve` runs the HTTP endpoint.
//!    - `analyze` runs one pipeline over a file or stdin and prints the state.
//!    - `models` lists the models that support text generation.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use llm::GeminiProvider;
use nodes::{LlmGateway, PipelineExecutor, RetrievalSettings};
use retrieval::FileHistoricalSource;
use tokio::io::AsyncReadExt;

use crate::config::{Cli, Command, LlmArgs, RetrievalArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let telemetry = telemetry::init(&cli.telemetry)?;
    let outcome = run(cli).await;
    if let Err(err) = &outcome {
        tracing::error!(error = %format!("{err:#}"), "placement-insights exited with an error");
    }
    telemetry.shutdown();
    outcome
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let provider = build_provider(&cli.llm, &cli.retrieval)?;

    match cli.command {
        Command::Models => list_models(&provider).await,
        Command::Serve { host, port } => {
            let executor = build_executor(provider, &cli.llm, &cli.retrieval).await?;
            listener::run_server(Arc::new(executor), &host, port)
                .await
                .with_context(|| format!("HTTP server on {host}:{port} failed"))
        }
        Command::Analyze { input } => {
            let raw_input = read_input(&input).await?;
            let executor = build_executor(provider, &cli.llm, &cli.retrieval).await?;
            let state = executor.run(raw_input).await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(())
        }
    }
}

/// Builds the provider on the first candidate model; no requests are sent.
fn build_provider(llm: &LlmArgs, retrieval: &RetrievalArgs) -> anyhow::Result<GeminiProvider> {
    let candidates = llm.candidate_models()?;
    let first = candidates
        .first()
        .cloned()
        .context("at least one candidate model is required")?;

    let client = reqwest::Client::builder()
        .timeout(llm.request_timeout())
        .build()
        .context("failed to build HTTP client")?;

    Ok(GeminiProvider::new(llm.api_key.clone(), first)
        .with_base_url(llm.base_url.clone())
        .with_client(client)
        .with_embedding_model(retrieval.embedding_model()?))
}

async fn build_executor(
    provider: GeminiProvider,
    llm: &LlmArgs,
    retrieval: &RetrievalArgs,
) -> anyhow::Result<PipelineExecutor> {
    let provider = if llm.skip_model_probe {
        tracing::info!(model = %provider.model(), "model probe skipped");
        provider
    } else {
        provider
            .select_model(&llm.candidate_models()?)
            .await
            .context("could not initialize any Gemini model")?
    };
    let provider = Arc::new(provider);

    let gateway = LlmGateway::new(provider.clone())
        .with_generation_config(llm.generation_config())
        .with_retry(llm.retry_settings());

    let history = Arc::new(FileHistoricalSource::new(retrieval.historical_data.clone()));

    let retrieval_settings = retrieval.enabled.then(|| {
        let mut settings = RetrievalSettings::new(provider.clone());
        settings.top_k = retrieval.top_k;
        settings
    });

    tracing::info!(
        model = %provider.model(),
        historical_data = %retrieval.historical_data.display(),
        retrieval = retrieval.enabled,
        "pipeline ready"
    );

    Ok(PipelineExecutor::new(gateway, history, retrieval_settings))
}

async fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("failed to read '{input}'"))
    }
}

async fn list_models(provider: &GeminiProvider) -> anyhow::Result<()> {
    let models = provider.list_models().await.context("failed to list models")?;
    for model in models.iter().filter(|m| m.supports_generation()) {
        match &model.display_name {
            Some(display) => println!("{}\t{display}", model.name),
            None => println!("{}", model.name),
        }
    }
    Ok(())
}
