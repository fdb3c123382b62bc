//! Placement Insights LLM provider adapter.
//!
//! Implements the [`pipeline::LlmProvider`] and [`pipeline::Embedder`] traits
//! for Google Gemini's REST API. Additional providers are added as new types
//! in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, response parsing,
//! and status-code classification live here. The [`pipeline`] crate sees only
//! [`pipeline::LlmProvider`] and [`pipeline::Embedder`]; the retry loop lives
//! in the `nodes` gateway.
//!
//! ## Status mapping
//!
//! | HTTP status | Error | Retry |
//! |-------------|-------|-------|
//! | 401, 403 | [`pipeline::LlmError::Auth`] | never |
//! | 429, 5xx | [`pipeline::LlmError::Api`] | yes, honouring `Retry-After` |
//! | other non-2xx | [`pipeline::LlmError::Api`] | never |
//! | no response | [`pipeline::LlmError::Transport`] | yes |

mod gemini;
mod wire;

pub use gemini::{GeminiProvider, ProbeError, DEFAULT_BASE_URL};
pub use wire::ModelInfo;
