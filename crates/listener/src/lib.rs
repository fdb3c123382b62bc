//! Placement Insights HTTP entry point.
//!
//! Exposes the pipeline over a single actix-web route:
//!
//! | Route | Method | Description |
//! |-------|--------|-------------|
//! | `/analyze` | `POST` | Runs the pipeline over `{"raw_data_text": "..."}` and returns the final state |
//! | `/health` | `GET` | Liveness probe |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Request parsing, status codes, and JSON error bodies
//! live here. The [`nodes::PipelineExecutor`] is constructed by the caller and
//! injected through [`AppState`].
//!
//! ## Error responses
//!
//! Every non-200 response has the body `{"error": "<message>"}`:
//! missing or blank input and malformed JSON map to 400, anything else to 500.

mod error;
mod handlers;
mod server;

pub use error::ApiError;
pub use handlers::AnalyzeRequest;
pub use server::{configure, run_server, AppState};
