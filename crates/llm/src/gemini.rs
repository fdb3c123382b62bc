//! Google Gemini provider.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    Embedder, EmbeddingModelName, GenerationConfig, LlmError, LlmProvider, ModelName, ModelReply,
};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::wire::{
    ApiErrorBody, BatchEmbedContentsRequest, BatchEmbedContentsResponse, Content,
    EmbedContentRequest, GenerateContentRequest, GenerateContentResponse, ListModelsResponse,
    ModelInfo,
};

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";
const PROBE_PROMPT: &str = "Hello";

/// Raised when none of the candidate models answers the startup probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no candidate models were configured")]
    NoCandidates,

    #[error("could not initialize any Gemini model (tried: {})", describe_failures(.failures))]
    NoResponsiveModel {
        /// Each candidate with the reason it was rejected.
        failures: Vec<(ModelName, String)>,
    },
}

fn describe_failures(failures: &[(ModelName, String)]) -> String {
    failures
        .iter()
        .map(|(model, reason)| format!("{model}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Google Gemini API provider.
///
/// One instance serves both text generation (`generateContent`) and
/// embeddings (`batchEmbedContents`). Construct it once and share it behind
/// an `Arc`.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: ModelName,
    embedding_model: EmbeddingModelName,
}

impl GeminiProvider {
    /// Create a new provider for `model` with an API key.
    pub fn new(api_key: impl Into<String>, model: ModelName) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            embedding_model: EmbeddingModelName::default(),
        }
    }

    /// Set a custom base URL (e.g. a proxy or a mock server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set the generation model.
    pub fn with_model(mut self, model: ModelName) -> Self {
        self.model = model;
        self
    }

    /// Set the embedding model used by the [`Embedder`] implementation.
    pub fn with_embedding_model(mut self, model: EmbeddingModelName) -> Self {
        self.embedding_model = model;
        self
    }

    /// The active generation model.
    pub fn model(&self) -> &ModelName {
        &self.model
    }

    /// The active embedding model.
    pub fn embedding_model(&self) -> &EmbeddingModelName {
        &self.embedding_model
    }

    fn method_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(API_KEY_HEADER, &self.api_key)
    }

    /// Lists every model visible to the API key, following pagination.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let url = format!("{}/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", "100".to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let request = self.authorized(self.client.get(&url)).query(&query);
            let page: ListModelsResponse = send(request).await?;
            models.extend(page.models);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = models.len(), "listed Gemini models");
        Ok(models)
    }

    /// Tries each candidate in order with a short prompt and keeps the first
    /// model that answers with text.
    pub async fn select_model(self, candidates: &[ModelName]) -> Result<Self, ProbeError> {
        if candidates.is_empty() {
            return Err(ProbeError::NoCandidates);
        }

        let config = GenerationConfig::default();
        let mut failures = Vec::new();

        for candidate in candidates {
            tracing::info!(model = %candidate, "probing model");
            let probe = self.clone().with_model(candidate.clone());
            match probe.generate(PROBE_PROMPT, &config).await {
                Ok(ModelReply::Text(_)) => {
                    tracing::info!(model = %candidate, "model initialized");
                    return Ok(probe);
                }
                Ok(other) => {
                    tracing::warn!(model = %candidate, reply = ?other, "model returned no text");
                    failures.push((candidate.clone(), format!("{other:?}")));
                }
                Err(err) => {
                    tracing::warn!(model = %candidate, error = %err, "model probe failed");
                    failures.push((candidate.clone(), err.to_string()));
                }
            }
        }

        Err(ProbeError::NoResponsiveModel { failures })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<ModelReply, LlmError> {
        let url = self.method_url(self.model.as_str(), "generateContent");
        let body = GenerateContentRequest::new(prompt, config);

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "sending generateContent request"
        );

        let request = self.authorized(self.client.post(&url)).json(&body);
        let response: GenerateContentResponse = send(request).await?;
        Ok(response.into_reply())
    }
}

#[async_trait]
impl Embedder for GeminiProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model_resource = format!("models/{}", self.embedding_model);
        let body = BatchEmbedContentsRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model_resource.clone(),
                    content: Content::bare(text),
                })
                .collect(),
        };

        let url = self.method_url(self.embedding_model.as_str(), "batchEmbedContents");
        tracing::debug!(model = %self.embedding_model, inputs = texts.len(), "sending batchEmbedContents request");

        let request = self.authorized(self.client.post(&url)).json(&body);
        let response: BatchEmbedContentsResponse = send(request).await?;

        if response.embeddings.len() != texts.len() {
            return Err(LlmError::Decode {
                message: format!(
                    "expected {} embeddings, received {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            });
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}

/// Sends the request and decodes a JSON body, mapping failures onto [`LlmError`].
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, LlmError> {
    let response = request.send().await.map_err(|e| LlmError::Transport {
        message: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(status_error(response).await);
    }

    let bytes = response.bytes().await.map_err(|e| LlmError::Transport {
        message: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| LlmError::Decode {
        message: e.to_string(),
    })
}

async fn status_error(response: Response) -> LlmError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    match status {
        401 | 403 => LlmError::Auth { status, message },
        _ => LlmError::Api {
            status,
            message,
            retry_after,
        },
    }
}
