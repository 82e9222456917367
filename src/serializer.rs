//! Serialization layer. Defaults to JSON via serde_json.
//!
//! Implement [`Serializer`] if a collection should be stored in another
//! format; the store only needs bytes in and a [`Value`] out.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Converts collections to/from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode a value to bytes.
    fn serialize<T>(&self, data: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized;

    /// Decode bytes into a generic JSON value.
    fn deserialize(&self, bytes: &[u8]) -> Result<Value>;
}

/// JSON serializer with optional pretty-printing.
///
/// Non-ASCII text is written as raw UTF-8, never `\u` escaped.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// `true` when output is indented.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Serializer for JsonSerializer {
    fn serialize<T>(&self, data: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(data)
        } else {
            serde_json::to_vec(data)
        };
        bytes.map_err(Error::from)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}
