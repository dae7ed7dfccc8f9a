//! Integration tests for the converter module.

use std::sync::Arc;
use unhtml::convert::{
    process, ConvertOptions, ConvertResult, ConverterRegistry, DocumentHandler, Extraction,
    HtmlConverter, OutputFormat, PlainTextConverter,
};
use unhtml::error::{Error, Result};
use unhtml::{Document, Source};

/// Mock handler for testing.
struct MockConverter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockConverter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl DocumentHandler for MockConverter {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn extract(&self, source: &Source, _options: &ConvertOptions) -> Result<Extraction> {
        Ok(Extraction::canonical(format!(
            "Extracted {} by {}",
            source.url, self.name
        )))
    }
}

/// Handler that always fails.
struct BrokenConverter;

impl DocumentHandler for BrokenConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["broken"]
    }

    fn name(&self) -> &str {
        "broken"
    }

    fn extract(&self, _source: &Source, _options: &ConvertOptions) -> Result<Extraction> {
        Err(Error::Other("cannot extract".to_string()))
    }
}

#[test]
fn test_converter_registry_new() {
    let registry = ConverterRegistry::new();

    // Empty registry should support nothing
    assert!(!registry.supports("html"));
    assert!(!registry.supports("txt"));
}

#[test]
fn test_converter_registry_with_defaults() {
    let registry = ConverterRegistry::with_defaults();

    assert!(registry.supports("html"));
    assert!(registry.supports("HTM")); // Case insensitive
    assert!(registry.supports("xhtml"));
    assert!(registry.supports("txt"));
    assert!(!registry.supports("pdf"));
}

#[test]
fn test_converter_registry_register() {
    let mut registry = ConverterRegistry::new();
    let converter = Arc::new(MockConverter::new(vec!["md", "markdown"], "markdown"));

    registry.register(converter);

    assert!(registry.supports("md"));
    assert!(registry.supports("markdown"));
    assert!(registry.supports("MD")); // Case insensitive
}

#[test]
fn test_converter_registry_multiple_converters() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(Arc::new(MockConverter::new(vec!["xml"], "xml")));

    assert!(registry.supports("html"));
    assert!(registry.supports("xml"));

    let converter = registry.get_by_name("xml");
    assert!(converter.is_some());
    assert!(converter.unwrap().supports_extension("XML"));
}

#[test]
fn test_supported_extensions() {
    let registry = ConverterRegistry::with_defaults();
    let extensions = registry.supported_extensions();

    assert!(extensions.contains(&"html"));
    assert!(extensions.contains(&"txt"));
}

#[test]
fn test_handler_names() {
    assert_eq!(HtmlConverter::new().name(), "html");
    assert_eq!(PlainTextConverter::new().name(), "txt");
}

#[test]
fn test_convert_result_methods() {
    let result = ConvertResult::new(Document::new("u"), b"hello".to_vec());

    assert_eq!(result.content_len(), 5);
    assert_eq!(result.mime_type, "text/plain");

    let json = result.with_mime_type("application/json");
    assert_eq!(json.mime_type, "application/json");
}

#[test]
fn test_output_format_default() {
    assert_eq!(OutputFormat::default(), OutputFormat::Text);
}

#[test]
fn test_mock_converter_through_process() {
    let source = Source::new("http://example.com/doc", Vec::new());
    let doc = process(
        &MockConverter::new(vec!["mock"], "mock"),
        &source,
        &ConvertOptions::default(),
    )
    .unwrap();
    assert_eq!(doc.text, "Extracted http://example.com/doc by mock");
    assert_eq!(doc.content, doc.text.as_bytes());
}

#[test]
fn test_handler_error_propagates() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(BrokenConverter));

    let source = Source::new("u", b"anything".to_vec());
    let result = registry.convert_as(&source, "broken", &ConvertOptions::default());
    assert!(matches!(result, Err(Error::Other(_))));
}

#[test]
fn test_registry_convert_path_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    // Markup in a .txt file is not interpreted
    std::fs::write(&path, "<b>not bold</b>").unwrap();

    let registry = ConverterRegistry::with_defaults();
    let result = registry
        .convert_path(&path, &ConvertOptions::default())
        .unwrap();
    assert_eq!(result.content, b"<b>not bold</b>");
}

#[test]
fn test_registry_convert_path_sniffs_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.php");
    std::fs::write(&path, "<html><body><p>dynamic</p></body></html>").unwrap();

    let registry = ConverterRegistry::with_defaults();
    let result = registry
        .convert_path(&path, &ConvertOptions::default())
        .unwrap();
    assert_eq!(result.content, b"\ndynamic\n");
}

#[test]
fn test_registry_convert_gzip_file() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"<div>inflated</div>").unwrap();
    let gz = encoder.finish().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html.gz");
    std::fs::write(&path, gz).unwrap();

    let registry = ConverterRegistry::with_defaults();
    let result = registry
        .convert_path(&path, &ConvertOptions::default())
        .unwrap();
    assert_eq!(result.content, b"\ninflated\n");
}

#[test]
fn test_registry_convert_as_unsupported() {
    let registry = ConverterRegistry::with_defaults();
    let source = Source::new("u", b"test".to_vec());

    let result = registry.convert_as(&source, "xyz", &ConvertOptions::default());
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_registry_convert_binary_is_unknown() {
    let registry = ConverterRegistry::with_defaults();
    let source = Source::new("u", vec![0x00, 0x01, 0x02]);

    let result = registry.convert(&source, &ConvertOptions::default());
    assert!(matches!(result, Err(Error::UnknownFormat)));
}
