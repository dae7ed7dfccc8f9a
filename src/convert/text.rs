//! Plain text handler.

use crate::error::Result;
use crate::model::Source;

use super::{ConvertOptions, DocumentHandler, Extraction};

/// Handler for payloads without markup; the bytes pass through for decoding.
#[derive(Debug, Clone, Default)]
pub struct PlainTextConverter {
    _private: (),
}

impl PlainTextConverter {
    /// Create a new plain text handler.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentHandler for PlainTextConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn name(&self) -> &str {
        "txt"
    }

    fn extract(&self, source: &Source, _options: &ConvertOptions) -> Result<Extraction> {
        Ok(Extraction::raw(source.bytes.clone()))
    }
}
