//! JSON error responses for the HTTP routes.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use pipeline::PipelineError;
use serde_json::json;
use thiserror::Error;

/// Errors returned to HTTP clients as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// `raw_data_text` was missing, null, empty, or blank.
    #[error("No data provided.")]
    NoData,

    /// The request body could not be parsed.
    #[error("{0}")]
    BadRequest(String),

    /// Any failure not caused by the request.
    #[error("{0}")]
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::EmptyInput => ApiError::NoData,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoData | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::StageKind;

    #[test]
    fn empty_input_maps_to_bad_request() {
        let err = ApiError::from(PipelineError::EmptyInput);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No data provided.");
    }

    #[test]
    fn invariant_violation_maps_to_internal_error() {
        let err = ApiError::from(PipelineError::FieldAlreadySet {
            stage: StageKind::ReportGenerator,
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "stage 'Report Generator' output has already been recorded"
        );
    }
}
