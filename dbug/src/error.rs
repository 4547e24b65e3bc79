//! Sanitization failures.
//!
//! A failure deep inside a value is wrapped once per enclosing container, so
//! the message reads as a path to the offending entry:
//!
//! ```text
//! key "scores": index 2: unsupported value: NaN
//! ```
//!
//! None of these ever reach the instrumented program through the dispatcher;
//! they are rendered into a failure document instead.

use serde_json::{json, Value};
use thiserror::Error;

/// Why a value could not be converted into a JSON-safe tree.
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// A mapping entry failed.
    #[error("key {key:?}: {source}")]
    Entry {
        key: String,
        #[source]
        source: Box<SanitizeError>,
    },

    /// A sequence element failed.
    #[error("index {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<SanitizeError>,
    },

    /// A record field failed.
    #[error("field {key}: {source}")]
    Field {
        key: String,
        #[source]
        source: Box<SanitizeError>,
    },

    /// NaN and infinities have no JSON representation.
    #[error("unsupported value: {0}")]
    UnsupportedFloat(f64),

    /// The value nests deeper than the sanitizer's limit.
    #[error("value nests deeper than {limit} levels")]
    TooDeep { limit: usize },

    /// The sanitized tree could not be rendered as text.
    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SanitizeError {
    pub(crate) fn entry(key: impl Into<String>, source: SanitizeError) -> Self {
        SanitizeError::Entry {
            key: key.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn element(index: usize, source: SanitizeError) -> Self {
        SanitizeError::Element {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn field(key: impl Into<String>, source: SanitizeError) -> Self {
        SanitizeError::Field {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// The innermost cause, with all container wrapping removed.
    pub fn root_cause(&self) -> &SanitizeError {
        match self {
            SanitizeError::Entry { source, .. }
            | SanitizeError::Element { source, .. }
            | SanitizeError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The document sent in place of a payload that failed to sanitize.
    pub fn to_document(&self) -> Value {
        json!({
            "error": "Serialization failed",
            "reason": self.to_string(),
        })
    }
}
