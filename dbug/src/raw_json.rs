//! Carriers for payloads that are already JSON-encoded.
//!
//! A [`RawJson`] field (or any field marked `#[dbug(raw_json)]`) is decoded
//! and embedded as structured JSON rather than shown as an opaque string.
//! Bytes that do not parse fall back to their text.

use std::{borrow::Cow, fmt};

use serde_json::Value;

use crate::inspect::{Inspect, Primitive, ValueShape};

/// Bytes holding a JSON document produced elsewhere.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RawJson(Vec<u8>);

impl RawJson {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<String> for RawJson {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl From<&str> for RawJson {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for RawJson {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for RawJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawJson")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

impl Inspect for RawJson {
    fn shape(&self) -> ValueShape<'_> {
        ValueShape::Primitive(Primitive::Str(String::from_utf8_lossy(&self.0)))
    }

    fn custom_json(&self) -> Option<String> {
        std::str::from_utf8(&self.0).ok().map(str::to_owned)
    }
}

/// Types that hold pre-encoded JSON and can be used with `#[dbug(raw_json)]`.
pub trait AsRawJson {
    fn raw_json_bytes(&self) -> &[u8];
}

impl AsRawJson for RawJson {
    fn raw_json_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRawJson for String {
    fn raw_json_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRawJson for str {
    fn raw_json_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRawJson for Vec<u8> {
    fn raw_json_bytes(&self) -> &[u8] {
        self
    }
}

impl AsRawJson for [u8] {
    fn raw_json_bytes(&self) -> &[u8] {
        self
    }
}

impl AsRawJson for Cow<'_, str> {
    fn raw_json_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<T: AsRawJson + ?Sized> AsRawJson for Box<T> {
    fn raw_json_bytes(&self) -> &[u8] {
        (**self).raw_json_bytes()
    }
}

/// Decodes raw JSON bytes, falling back to their (lossy) text.
pub(crate) fn decode(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
