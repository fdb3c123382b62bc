//! Error and retry-policy types for the placement pipeline.
//!
//! [`PipelineError`] covers the few conditions that stop a run before or while
//! it executes: blank input and violations of the state invariants. Model
//! failures never surface as `PipelineError`; the gateway converts them into
//! [`crate::StageOutput`] values so every run completes.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StageKind;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by infrastructure error types to let the gateway decide whether to
/// re-invoke the model.
///
/// - `Retryable` errors: transport failures, rate limiting, provider 5xx.
/// - `NonRetryable` errors: bad credentials, malformed requests, unknown model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt (e.g. from a `Retry-After`
        /// header). `None` means apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Language model errors
// ---------------------------------------------------------------------------

/// Failures reported by an [`crate::LlmProvider`] or [`crate::Embedder`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, reset).
    #[error("transport error: {message}")]
    Transport {
        /// Description of the underlying transport failure.
        message: String,
    },

    /// The provider rejected the credentials.
    #[error("authentication failed (HTTP {status}): {message}")]
    Auth {
        /// HTTP status code returned by the provider (401 or 403).
        status: u16,
        /// Response body or provider error message.
        message: String,
    },

    /// The provider returned a non-success status other than an auth failure.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body or provider error message.
        message: String,
        /// Delay requested by the provider, if any.
        retry_after: Option<Duration>,
    },

    /// The response body could not be decoded.
    #[error("could not decode response: {message}")]
    Decode {
        /// Decoder error message.
        message: String,
    },
}

impl LlmError {
    /// Classifies this error for the gateway's retry loop.
    ///
    /// Rate limiting (429) and server errors (5xx) are retryable; any other
    /// HTTP status means the same request will fail again.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            LlmError::Transport { .. } | LlmError::Decode { .. } => {
                RetryPolicy::Retryable { after: None }
            }
            LlmError::Auth { .. } => RetryPolicy::NonRetryable,
            LlmError::Api {
                status,
                retry_after,
                ..
            } => {
                if *status == 429 || *status >= 500 {
                    RetryPolicy::Retryable {
                        after: *retry_after,
                    }
                } else {
                    RetryPolicy::NonRetryable
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Historical corpus errors
// ---------------------------------------------------------------------------

/// Failures reading the historical corpus.
///
/// A missing corpus is not an error; sources report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    /// The corpus exists but could not be read.
    #[error("could not read historical data from '{location}': {message}")]
    Io {
        /// Where the source tried to read from (usually a file path).
        location: String,
        /// Underlying I/O error message.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that prevent a pipeline run from starting or completing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The raw input was empty or only whitespace.
    #[error("No data provided.")]
    EmptyInput,

    /// A stage tried to write a field that already holds a value.
    #[error("stage '{stage}' output has already been recorded")]
    FieldAlreadySet {
        /// The stage whose field was written twice.
        stage: StageKind,
    },

    /// A stage tried to write its field before a predecessor had written its own.
    #[error("stage '{stage}' cannot run before '{missing}' has produced output")]
    OutOfOrder {
        /// The stage that attempted the write.
        stage: StageKind,
        /// The earliest predecessor whose field is still empty.
        missing: StageKind,
    },

    /// The runtime configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_retryable_with_provider_delay() {
        let err = LlmError::Api {
            status: 429,
            message: "quota".into(),
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(
            err.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(2))
            }
        );
    }

    #[test]
    fn server_errors_and_transport_failures_are_retryable() {
        let server = LlmError::Api {
            status: 503,
            message: "unavailable".into(),
            retry_after: None,
        };
        let transport = LlmError::Transport {
            message: "connection reset".into(),
        };
        assert_eq!(server.retry_policy(), RetryPolicy::Retryable { after: None });
        assert_eq!(
            transport.retry_policy(),
            RetryPolicy::Retryable { after: None }
        );
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let bad_request = LlmError::Api {
            status: 400,
            message: "invalid argument".into(),
            retry_after: None,
        };
        let auth = LlmError::Auth {
            status: 403,
            message: "API key not valid".into(),
        };
        assert_eq!(bad_request.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(auth.retry_policy(), RetryPolicy::NonRetryable);
    }

    #[test]
    fn empty_input_message_matches_endpoint_contract() {
        assert_eq!(PipelineError::EmptyInput.to_string(), "No data provided.");
    }
}
