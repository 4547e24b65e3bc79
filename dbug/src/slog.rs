//! Adapters for emitting sanitized values through `slog`.
//!
//! This module connects [`Inspect`] with `slog` by providing a `slog::Value`
//! that serializes the sanitized tree as structured JSON via `slog`'s
//! nested-value support.
//!
//! It is responsible for:
//! - Ensuring the logged representation is the sanitized tree, so cyclic and
//!   handle-bearing values log safely.
//! - Avoiding fallible logging APIs: a sanitization failure is logged as the
//!   failure document rather than returned to `slog`.
//!
//! It does not configure `slog` or send anything to the debug endpoint.

use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{inspect::Inspect, sanitize::sanitize};

/// A `slog::Value` that emits a sanitized payload as structured JSON.
pub struct SanitizedJson {
    value: JsonValue,
}

impl SanitizedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The tree that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for SanitizedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts values into a `slog::Value` that logs their sanitized form.
///
/// ## Example
/// ```ignore
/// use dbug::slog::IntoSanitizedJson;
///
/// info!(logger, "event"; "graph" => graph.to_sanitized_json());
/// ```
pub trait IntoSanitizedJson: Inspect {
    /// Sanitizes `self` and returns a `slog::Value` holding the tree.
    ///
    /// If sanitization fails, the returned value holds the failure document
    /// (`{"error": "Serialization failed", "reason": ...}`).
    fn to_sanitized_json(&self) -> SanitizedJson {
        let value = sanitize(self.as_dyn()).unwrap_or_else(|err| err.to_document());
        SanitizedJson::new(value)
    }

    #[doc(hidden)]
    fn as_dyn(&self) -> &dyn Inspect;
}

impl<T> IntoSanitizedJson for T
where
    T: Inspect,
{
    fn as_dyn(&self) -> &dyn Inspect {
        self
    }
}
