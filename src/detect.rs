//! Payload format detection.

use crate::error::{Error, Result};
use regex::bytes::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

/// Recognized payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// HTML or XHTML markup
    Html,
    /// Plain text without markup
    Text,
    /// Gzip-compressed payload (format of the inner data unknown)
    Gzip,
}

impl SourceFormat {
    /// Canonical short name, used as the converter registry key.
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Html => "html",
            SourceFormat::Text => "txt",
            SourceFormat::Gzip => "gz",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Gzip magic bytes.
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// How many bytes after leading whitespace are inspected when sniffing.
const SNIFF_LEN: usize = 1024;

/// Any tag opener, closing tag, comment or doctype.
static TAG_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:!--|!doctype\s|/?[a-z][a-z0-9-]*[\s/>])")
        .expect("tag pattern is valid")
});

/// Detect the payload format from a file path.
///
/// Leading whitespace is skipped before the sniffed prefix is read.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut skipped = 0usize;
    loop {
        let buf = reader.fill_buf()?;
        let len = buf.len();
        let blank = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
        reader.consume(blank);
        skipped += blank;
        if len == 0 || blank < len {
            break;
        }
    }

    let mut header = Vec::with_capacity(SNIFF_LEN);
    reader.take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    if header.is_empty() && skipped > 0 {
        return Ok(SourceFormat::Text);
    }
    detect_format_from_bytes(&header)
}

/// Detect the payload format from bytes.
///
/// Any tag-like construct within the first `SNIFF_LEN` bytes after leading
/// whitespace marks the payload as HTML.
///
/// # Returns
/// * `Ok(SourceFormat)` for gzip, HTML or plain text data
/// * `Err(Error::UnknownFormat)` for empty or binary data
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.is_empty() {
        return Err(Error::UnknownFormat);
    }

    if data.starts_with(GZIP_MAGIC) {
        return Ok(SourceFormat::Gzip);
    }

    let blank = data.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let trimmed = &data[blank..];
    let prefix = &trimmed[..trimmed.len().min(SNIFF_LEN)];

    // NUL bytes outside UTF-16 text mean binary content
    if !has_utf16_bom(data) && prefix.contains(&0) {
        return Err(Error::UnknownFormat);
    }

    if TAG_OPENER.is_match(prefix) {
        Ok(SourceFormat::Html)
    } else {
        Ok(SourceFormat::Text)
    }
}

fn has_utf16_bom(data: &[u8]) -> bool {
    data.starts_with(&[0xff, 0xfe]) || data.starts_with(&[0xfe, 0xff])
}

/// Check if bytes look like HTML.
pub fn is_html_bytes(data: &[u8]) -> bool {
    matches!(detect_format_from_bytes(data), Ok(SourceFormat::Html))
}

/// Check if bytes are gzip-compressed.
pub fn is_gzip_bytes(data: &[u8]) -> bool {
    data.starts_with(GZIP_MAGIC)
}
