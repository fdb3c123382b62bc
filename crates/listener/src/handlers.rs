//! Route handlers for `/analyze` and `/health`.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::server::AppState;

/// Body of `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub raw_data_text: Option<String>,
}

pub async fn analyze(
    state: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let raw_input = body.into_inner().raw_data_text.unwrap_or_default();
    if raw_input.trim().is_empty() {
        tracing::info!("rejected analyze request without data");
        return Err(ApiError::NoData);
    }

    let final_state = state.executor.run(raw_input).await.map_err(|err| {
        tracing::error!(error = %err, "pipeline run failed");
        ApiError::from(err)
    })?;

    Ok(HttpResponse::Ok().json(final_state))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
