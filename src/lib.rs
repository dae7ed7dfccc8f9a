//! # unhtml
//!
//! Visible-text extraction from crawled HTML.
//!
//! This library turns HTML of unknown encoding into a deterministic plain
//! text rendering that keeps only what a reader would see, with tables
//! redrawn as fixed-width ASCII grids.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unhtml::process_file;
//!
//! fn main() -> unhtml::Result<()> {
//!     let doc = process_file("page.html")?;
//!     println!("{}", doc.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Encoding normalization**: byte-order mark, declared label, then
//!   statistical detection; output re-encoded to one fixed encoding
//! - **Table transcoding**: every table becomes one ASCII grid block
//! - **Inline flattening**: emphasis, links and spans are unwrapped
//! - **Visibility filtering**: scripts, styles and head content are dropped
//! - **Parallel processing**: independent pages via Rayon

pub mod convert;
pub mod crawl;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    process, process_batch, ConvertOptions, ConvertResult, ConverterRegistry, DocumentHandler,
    Extraction, HtmlConverter, OutputFormat, PlainTextConverter,
};
#[cfg(feature = "async")]
pub use convert::process_async;
pub use crawl::{discover_links, Link, LinkError, LinkKind};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SourceFormat};
pub use error::{Error, Result};
pub use model::{Document, NodeId, Source, TableModel, Tree};
pub use parser::{decode, encode, parse_html, HtmlParser, Payload};
pub use render::{ExtractionStats, JsonFormat, TextOptions};

use std::path::Path;

/// Render an HTML string to visible plain text with default options.
///
/// # Example
///
/// ```
/// let text = unhtml::html_to_text("<p>Hello <b>world</b>!</p>");
/// assert_eq!(text, "\nHello world!\n");
/// ```
pub fn html_to_text(html: &str) -> String {
    html_to_text_with_options(html, &TextOptions::default())
}

/// Render an HTML string to visible plain text.
///
/// # Example
///
/// ```
/// use unhtml::{html_to_text_with_options, TextOptions};
///
/// let options = TextOptions::new().with_separator(" # ").with_border_fill("=");
/// let text = html_to_text_with_options("<table><tr><td>a</td></tr></table>", &options);
/// assert!(text.contains("# a # "));
/// ```
pub fn html_to_text_with_options(html: &str, options: &TextOptions) -> String {
    render::to_text(parse_html(html), options)
}

/// Process a crawled HTML payload into a document.
///
/// # Arguments
///
/// * `url` - URL the payload was fetched from
/// * `data` - Raw bytes in any encoding, optionally gzip-compressed
pub fn process_bytes(url: &str, data: &[u8]) -> Result<Document> {
    let source = Source::from_bytes(url, data)?;
    process(&HtmlConverter::new(), &source, &ConvertOptions::default())
}

/// Process a file, choosing the handler by extension or content.
///
/// # Example
///
/// ```no_run
/// use unhtml::process_file;
///
/// let doc = process_file("page.html").unwrap();
/// println!("{} bytes", doc.content_len());
/// ```
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert_path(path.as_ref(), &ConvertOptions::default())?;
    Ok(result.document)
}

/// Extract visible text from an HTML file.
///
/// # Example
///
/// ```no_run
/// use unhtml::extract_text;
///
/// let text = extract_text("page.html").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(process_file(path)?.text)
}

/// Process a file and describe the result as JSON.
///
/// # Example
///
/// ```no_run
/// use unhtml::{to_json, JsonFormat};
///
/// let json = to_json("page.html", JsonFormat::Pretty).unwrap();
/// std::fs::write("page.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = process_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for processing HTML documents.
///
/// # Example
///
/// ```no_run
/// use unhtml::Unhtml;
///
/// let doc = Unhtml::new()
///     .with_separator(" ; ")
///     .dedupe_nested()
///     .with_stats()
///     .process_file("page.html")?;
/// println!("{} tables", doc.stats.table_count);
/// # Ok::<(), unhtml::Error>(())
/// ```
pub struct Unhtml {
    options: ConvertOptions,
    declared_encoding: Option<String>,
}

impl Unhtml {
    /// Create a new Unhtml builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            declared_encoding: None,
        }
    }

    /// Use these text options as the starting point.
    pub fn with_text_options(mut self, options: TextOptions) -> Self {
        self.options.text = options;
        self
    }

    /// Set the table column separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.options.text = self.options.text.with_separator(separator);
        self
    }

    /// Set the table border fill.
    pub fn with_border_fill(mut self, fill: impl Into<String>) -> Self {
        self.options.text = self.options.text.with_border_fill(fill);
        self
    }

    /// Set the output encoding label.
    pub fn with_output_encoding(mut self, label: impl Into<String>) -> Self {
        self.options.text = self.options.text.with_output_encoding(label);
        self
    }

    /// Assume this encoding for payloads without a byte-order mark.
    pub fn with_declared_encoding(mut self, label: impl Into<String>) -> Self {
        self.declared_encoding = Some(label.into());
        self
    }

    /// Emit each subtree's text once.
    pub fn dedupe_nested(mut self) -> Self {
        self.options.text = self.options.text.with_dedupe_nested(true);
        self
    }

    /// Apply NFC normalization to the output.
    pub fn normalize_unicode(mut self) -> Self {
        self.options.text = self.options.text.with_unicode_normalization(true);
        self
    }

    /// Collect extraction statistics.
    pub fn with_stats(mut self) -> Self {
        self.options.collect_stats = true;
        self
    }

    /// Process a source.
    pub fn process(&self, source: Source) -> Result<Document> {
        self.options.text.validate()?;
        let source = match (&self.declared_encoding, &source.declared_encoding) {
            (Some(label), None) => source.with_declared_encoding(label.clone()),
            _ => source,
        };
        process(&HtmlConverter::new(), &source, &self.options)
    }

    /// Process raw bytes fetched from a URL.
    pub fn process_bytes(&self, url: &str, data: &[u8]) -> Result<Document> {
        self.process(Source::from_bytes(url, data)?)
    }

    /// Process an HTML file.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        self.process(Source::from_path(path)?)
    }
}

impl Default for Unhtml {
    fn default() -> Self {
        Self::new()
    }
}
