//! Document handlers and the conversion pipeline.
//!
//! A [`DocumentHandler`] knows how to pull a payload out of one kind of
//! source. [`process`] is the same for every handler: extract, decode to
//! canonical text, encode to the output encoding. The
//! [`ConverterRegistry`] picks a handler by format name or extension.
//!
//! # Example
//!
//! ```no_run
//! use unhtml::convert::{ConvertOptions, ConverterRegistry};
//! use unhtml::Source;
//!
//! fn main() -> unhtml::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let source = Source::from_path("page.html")?;
//!
//!     let result = registry.convert(&source, &ConvertOptions::default())?;
//!     println!("{}", result.document.text);
//!     Ok(())
//! }
//! ```

mod html;
mod text;

pub use html::HtmlConverter;
pub use text::PlainTextConverter;

use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::{Error, Result};
use crate::model::{Document, Source};
use crate::parser::{decode, encode, resolve_label, Payload};
use crate::render::{to_json, ExtractionStats, JsonFormat, TextOptions};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Text rendering options
    pub text: TextOptions,

    /// Whether to collect statistics during conversion
    pub collect_stats: bool,

    /// Output format
    pub output_format: OutputFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set text rendering options.
    pub fn with_text_options(mut self, options: TextOptions) -> Self {
        self.text = options;
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text in the configured output encoding
    #[default]
    Text,

    /// JSON description of the processed document
    Json,
}

/// What a handler pulled out of a source.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Raw bytes or canonical text
    pub payload: Payload,

    /// Encoding the handler already decoded with, if it decoded at all
    pub encoding: Option<&'static str>,

    /// Whether that encoding was declared or confidently detected
    pub confident: bool,

    /// Statistics gathered while extracting
    pub stats: ExtractionStats,
}

impl Extraction {
    /// An extraction that still needs decoding.
    pub fn raw(bytes: Vec<u8>) -> Self {
        Self {
            payload: Payload::Raw(bytes),
            encoding: None,
            confident: true,
            stats: ExtractionStats::default(),
        }
    }

    /// An extraction that is already canonical text.
    pub fn canonical(text: String) -> Self {
        Self {
            payload: Payload::Canonical(text),
            encoding: None,
            confident: true,
            stats: ExtractionStats::default(),
        }
    }

    /// Record the encoding used to produce canonical text.
    pub fn with_encoding(mut self, encoding: Option<&'static str>, confident: bool) -> Self {
        self.encoding = encoding;
        self.confident = confident;
        self
    }

    /// Set extraction statistics.
    pub fn with_stats(mut self, stats: ExtractionStats) -> Self {
        self.stats = stats;
        self
    }
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// The processed document
    pub document: Document,

    /// Output bytes in the requested format
    pub content: Vec<u8>,

    /// MIME type of the output
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(document: Document, content: Vec<u8>) -> Self {
        Self {
            document,
            content,
            mime_type: "text/plain",
        }
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Extraction capability for one kind of source.
///
/// Implement this trait to add support for a new source format.
pub trait DocumentHandler: Send + Sync {
    /// Get the supported file extensions for this handler.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["html"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this handler.
    fn name(&self) -> &str;

    /// Pull a payload out of a source.
    fn extract(&self, source: &Source, options: &ConvertOptions) -> Result<Extraction>;

    /// Check if this handler supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Run one source through a handler: extract, decode, encode.
///
/// Fails only if the handler does or the output encoding label is unknown.
pub fn process(
    handler: &dyn DocumentHandler,
    source: &Source,
    options: &ConvertOptions,
) -> Result<Document> {
    let target = resolve_label(&options.text.output_encoding)?;
    let extraction = handler.extract(source, options)?;

    let decoded = decode(extraction.payload, source.declared_encoding.as_deref());
    let (encoding, confident) = match decoded.encoding_name() {
        Some(name) => (Some(name), decoded.confident),
        None => (extraction.encoding, extraction.confident),
    };

    let content = encode(&decoded.text, target);
    log::debug!(
        "Processed {} with {} handler: {} bytes out",
        source.url,
        handler.name(),
        content.len()
    );

    let mut stats = extraction.stats;
    if options.collect_stats && stats.word_count == 0 && stats.char_count == 0 {
        stats.count_text(&decoded.text);
    }

    Ok(Document {
        url: source.url.clone(),
        encoding: encoding.map(str::to_string),
        confident,
        text: decoded.text,
        stats,
        content,
    })
}

/// Process independent sources in parallel.
///
/// Each source gets its own result; a failure is logged and never affects
/// the others.
pub fn process_batch(
    registry: &ConverterRegistry,
    sources: &[Source],
    options: &ConvertOptions,
) -> Vec<Result<ConvertResult>> {
    sources
        .par_iter()
        .map(|source| {
            let result = registry.convert(source, options);
            if let Err(ref e) = result {
                log::warn!("Failed to process {}: {}", source.url, e);
            }
            result
        })
        .collect()
}

/// Process one source on tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn process_async(
    registry: Arc<ConverterRegistry>,
    source: Source,
    options: ConvertOptions,
) -> Result<ConvertResult> {
    tokio::task::spawn_blocking(move || registry.convert(&source, &options))
        .await
        .map_err(|e| Error::Task(e.to_string()))?
}

/// Registry for document handlers.
///
/// The registry maps extensions and format names to handlers and provides
/// convenient methods for converting sources.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentHandler>>,
    by_name: HashMap<String, Arc<dyn DocumentHandler>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with default handlers (HTML and plain text).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HtmlConverter::new()));
        registry.register(Arc::new(PlainTextConverter::new()));
        registry
    }

    /// Register a handler.
    ///
    /// The handler will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentHandler>) {
        for ext in converter.supported_extensions() {
            self.converters
                .insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a handler by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentHandler>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a handler by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentHandler>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.converters.keys().map(|s| s.as_str()).collect()
    }

    /// Find the handler for a sniffed format.
    pub fn handler_for(&self, format: SourceFormat) -> Result<Arc<dyn DocumentHandler>> {
        self.get_by_name(format.name())
            .ok_or_else(|| Error::UnsupportedFormat(format.name().to_string()))
    }

    /// Convert a source, picking the handler by the extension of its URL
    /// path and falling back to sniffing its bytes.
    ///
    /// An empty source is treated as plain text and yields empty output.
    pub fn convert(&self, source: &Source, options: &ConvertOptions) -> Result<ConvertResult> {
        if let Some(handler) = url_extension(&source.url).and_then(|e| self.get_by_extension(&e)) {
            return self.convert_with(handler.as_ref(), source, options);
        }

        let format = if source.is_empty() {
            SourceFormat::Text
        } else {
            detect_format_from_bytes(&source.bytes)?
        };
        let handler = self.handler_for(format)?;
        self.convert_with(handler.as_ref(), source, options)
    }

    /// Convert a file, picking the handler by extension and falling back to
    /// sniffing the content.
    pub fn convert_path(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let source = Source::from_path(path)?;
        let handler = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext));

        match handler {
            Some(handler) => self.convert_with(handler.as_ref(), &source, options),
            None => self.convert(&source, options),
        }
    }

    /// Convert a source using the handler registered for an extension.
    pub fn convert_as(
        &self,
        source: &Source,
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let handler = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(ext.to_string()))?;

        self.convert_with(handler.as_ref(), source, options)
    }

    fn convert_with(
        &self,
        handler: &dyn DocumentHandler,
        source: &Source,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let document = process(handler, source, options)?;
        match options.output_format {
            OutputFormat::Text => {
                let content = document.content.clone();
                Ok(ConvertResult::new(document, content).with_mime_type("text/plain"))
            }
            OutputFormat::Json => {
                let content = to_json(&document, JsonFormat::Pretty)?.into_bytes();
                Ok(ConvertResult::new(document, content).with_mime_type("application/json"))
            }
        }
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Extension of the last segment of a URL's path, lowercased.
fn url_extension(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_text_options(TextOptions::default().with_separator(" # "))
            .with_stats(true)
            .with_format(OutputFormat::Json);

        assert_eq!(options.text.column_separator, " # ");
        assert!(options.collect_stats);
        assert_eq!(options.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.supports("html"));
        assert!(registry.supports("HTM"));
        assert!(registry.supports("txt"));
        assert!(!registry.supports("pdf"));
    }

    #[test]
    fn test_registry_get_by_extension() {
        let registry = ConverterRegistry::with_defaults();
        let converter = registry.get_by_extension("xhtml");
        assert!(converter.is_some());
        assert_eq!(converter.unwrap().name(), "html");
    }

    #[test]
    fn test_registry_get_by_name() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.get_by_name("txt").is_some());
        assert!(registry.get_by_name("HTML").is_some());
    }

    #[test]
    fn test_missing_handler_is_unsupported() {
        let registry = ConverterRegistry::new();
        let source = Source::new("u", b"<p>x</p>".to_vec());
        let err = registry.convert(&source, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref f) if f == "html"));
    }

    #[test]
    fn test_gzip_source_without_handler() {
        let registry = ConverterRegistry::with_defaults();
        let source = Source::new("u", vec![0x1f, 0x8b, 0x08, 0x00]);
        let err = registry.convert(&source, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref f) if f == "gz"));
    }

    #[test]
    fn test_process_html() {
        let source = Source::new("http://example.com/", b"<p>Hello <b>world</b>!</p>".to_vec());
        let doc = process(&HtmlConverter::new(), &source, &ConvertOptions::default()).unwrap();
        assert_eq!(doc.text, "\nHello world!\n");
        assert_eq!(doc.content, b"\nHello world!\n");
        assert_eq!(doc.url, "http://example.com/");
    }

    #[test]
    fn test_process_empty_source() {
        let source = Source::new("u", Vec::new());
        let doc = process(&HtmlConverter::new(), &source, &ConvertOptions::default()).unwrap();
        assert!(doc.text.is_empty());
        assert!(doc.content.is_empty());
    }

    #[test]
    fn test_process_rejects_unknown_output_encoding() {
        let options = ConvertOptions::new()
            .with_text_options(TextOptions::default().with_output_encoding("klingon"));
        let source = Source::new("u", b"x".to_vec());
        let err = process(&PlainTextConverter::new(), &source, &options).unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding(_)));
    }

    #[test]
    fn test_process_output_encoding() {
        let options = ConvertOptions::new()
            .with_text_options(TextOptions::default().with_output_encoding("windows-1252"));
        let source = Source::new("u", "<p>café ☃</p>".as_bytes().to_vec())
            .with_declared_encoding("utf-8");
        let doc = process(&HtmlConverter::new(), &source, &options).unwrap();
        // The snowman has no windows-1252 form and is dropped
        assert_eq!(doc.content, b"\ncaf\xe9 \n");
        assert_eq!(doc.encoding.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_convert_json() {
        let registry = ConverterRegistry::with_defaults();
        let options = ConvertOptions::new().with_format(OutputFormat::Json);
        let source = Source::new("http://example.com/", b"<p>hi</p>".to_vec());

        let result = registry.convert(&source, &options).unwrap();
        assert_eq!(result.mime_type, "application/json");
        let json = String::from_utf8(result.content).unwrap();
        assert!(json.contains("\"url\": \"http://example.com/\""));
    }

    #[test]
    fn test_process_batch_isolates_failures() {
        let registry = ConverterRegistry::with_defaults();
        let sources = vec![
            Source::new("a", b"<p>one</p>".to_vec()),
            Source::new("b", vec![0u8, 1, 2, 3]),
            Source::new("c", b"plain two".to_vec()),
        ];

        let results = process_batch(&registry, &sources, &ConvertOptions::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().content, b"\none\n");
        assert!(matches!(results[1], Err(Error::UnknownFormat)));
        assert_eq!(results[2].as_ref().unwrap().content, b"plain two");
    }

    #[test]
    fn test_process_batch_renders_uncommon_markup() {
        let registry = ConverterRegistry::with_defaults();
        let mut padded = " ".repeat(2048).into_bytes();
        padded.extend_from_slice(b"<h2>late</h2>");
        let sources = vec![
            Source::new("http://example.com/", b"<h1>Title</h1><ul><li>one</li></ul>".to_vec()),
            Source::new("http://example.com/padded", padded),
        ];

        let results = process_batch(&registry, &sources, &ConvertOptions::default());
        assert_eq!(results[0].as_ref().unwrap().content, b"\nTitle\n\none\n\none\n");
        assert_eq!(results[1].as_ref().unwrap().content, b"\nlate\n");
    }

    #[test]
    fn test_convert_prefers_url_extension() {
        let registry = ConverterRegistry::with_defaults();
        let options = ConvertOptions::default();

        // Loose text directly under body is not shown by the HTML handler
        let page = Source::new("http://example.com/about.HTML?x=1", b"just words".to_vec());
        assert!(registry.convert(&page, &options).unwrap().document.text.is_empty());

        let notes = Source::new("file:///tmp/notes.txt", b"<b>raw</b>".to_vec());
        assert_eq!(registry.convert(&notes, &options).unwrap().content, b"<b>raw</b>");
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("http://x.com/a/page.htm").as_deref(), Some("htm"));
        assert_eq!(url_extension("file:///data/Report.TXT").as_deref(), Some("txt"));
        assert_eq!(url_extension("http://x.com/").as_deref(), None);
        assert_eq!(url_extension("http://x.com/.hidden").as_deref(), None);
        assert_eq!(url_extension("not a url"), None);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_process_async() {
        let registry = Arc::new(ConverterRegistry::with_defaults());
        let source = Source::new("u", b"<div>async</div>".to_vec());
        let result = process_async(registry, source, ConvertOptions::default())
            .await
            .unwrap();
        assert_eq!(result.content, b"\nasync\n");
    }
}
