//! Newtype identifiers.
//!
//! Model names and run identifiers are distinct newtypes so a generation model
//! can never be passed where an embedding model is expected, even though both
//! are strings under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for model-name newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// Gemini reports models as "models/<name>"; the prefix is stripped on entry.
// ---------------------------------------------------------------------------
macro_rules! model_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new model name, returning `None` if the value is blank.
            ///
            /// A leading `models/` resource prefix is removed.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let v = v.trim();
                let v = v.strip_prefix("models/").unwrap_or(v);
                if v.is_empty() { None } else { Some(Self(v.to_string())) }
            }

            /// Returns the bare model name (without the `models/` prefix).
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

model_id! {
    /// Identifies a text-generation model (e.g. `"gemini-2.5-flash"`).
    ModelName
}

model_id! {
    /// Identifies an embedding model (e.g. `"text-embedding-004"`).
    EmbeddingModelName
}

impl Default for EmbeddingModelName {
    fn default() -> Self {
        Self("text-embedding-004".to_string())
    }
}

// ---------------------------------------------------------------------------
// Run identifiers (UUID-backed, generated per pipeline run)
// ---------------------------------------------------------------------------

/// Identifies a single pipeline run (one `/analyze` request or one CLI invocation).
///
/// Generated fresh for every run and attached to tracing spans so all activity
/// from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
