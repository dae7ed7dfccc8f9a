//! Document-level types.

use crate::detect::is_gzip_bytes;
use crate::error::Result;
use crate::render::ExtractionStats;
use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// A crawled payload waiting to be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// URL the payload was fetched from (document identifier)
    pub url: String,

    /// Raw payload bytes
    pub bytes: Vec<u8>,

    /// Encoding label declared by the transport, e.g. a `Content-Type` charset
    pub declared_encoding: Option<String>,
}

impl Source {
    /// Create a source from its URL and raw bytes.
    pub fn new(url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            bytes: bytes.into(),
            declared_encoding: None,
        }
    }

    /// Create a source, inflating gzip-compressed bytes.
    pub fn from_bytes(url: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(url, inflate(bytes)?))
    }

    /// Read a source from a file, inflating gzip-compressed content.
    ///
    /// The URL is the `file://` form of the canonicalized path when it can
    /// be built, otherwise the path as given.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let url = path
            .canonicalize()
            .ok()
            .and_then(|p| url::Url::from_file_path(p).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(url, &bytes)
    }

    /// Set the declared encoding label.
    pub fn with_declared_encoding(mut self, label: impl Into<String>) -> Self {
        self.declared_encoding = Some(label.into());
        self
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Inflate gzip data; anything else is returned as is.
fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    if !is_gzip_bytes(bytes) {
        return Ok(bytes.to_vec());
    }
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    log::debug!("Inflated {} gzip bytes to {}", bytes.len(), inflated.len());
    Ok(inflated)
}

/// A converted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Originating URL
    pub url: String,

    /// Name of the encoding the payload was decoded with
    pub encoding: Option<String>,

    /// Whether the encoding was declared or detected with confidence
    pub confident: bool,

    /// Canonical rendered text
    pub text: String,

    /// Extraction statistics
    pub stats: ExtractionStats,

    /// Rendered text in the output encoding
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl Document {
    /// Create an empty document for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Check if the rendering produced no output.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_source_builder() {
        let source = Source::new("http://example.com/", b"<p>x</p>".to_vec())
            .with_declared_encoding("utf-8");
        assert_eq!(source.declared_encoding.as_deref(), Some("utf-8"));
        assert!(!source.is_empty());
    }

    #[test]
    fn test_from_bytes_inflates_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"<p>compressed</p>").unwrap();
        let gz = encoder.finish().unwrap();

        let source = Source::from_bytes("http://example.com/", &gz).unwrap();
        assert_eq!(source.bytes, b"<p>compressed</p>");
    }

    #[test]
    fn test_from_bytes_plain_passthrough() {
        let source = Source::from_bytes("u", b"plain").unwrap();
        assert_eq!(source.bytes, b"plain");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<p>file</p>").unwrap();

        let source = Source::from_path(&path).unwrap();
        assert_eq!(source.bytes, b"<p>file</p>");
        assert!(source.url.starts_with("file://"));
        assert!(source.url.ends_with("page.html"));
    }

    #[test]
    fn test_document_new() {
        let doc = Document::new("http://example.com/");
        assert!(doc.is_empty());
        assert_eq!(doc.url, "http://example.com/");
    }
}
