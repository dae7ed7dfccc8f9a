//! HTML document handler.

use crate::error::Result;
use crate::model::Source;
use crate::parser::HtmlParser;
use crate::render::TextRenderer;

use super::{ConvertOptions, DocumentHandler, Extraction};

/// HTML document handler.
///
/// Decodes and parses the markup, then renders the visible text. The
/// payload it hands back is already canonical.
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    _private: (),
}

impl HtmlConverter {
    /// Create a new HTML handler.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentHandler for HtmlConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm", "xhtml"]
    }

    fn name(&self) -> &str {
        "html"
    }

    fn extract(&self, source: &Source, options: &ConvertOptions) -> Result<Extraction> {
        let parser = HtmlParser::from_source(source);
        let decoded = parser.decoded();
        let encoding = decoded.encoding_name();
        let confident = decoded.confident;

        let tree = parser.parse();
        let renderer = TextRenderer::new(options.text.clone());
        let extraction = if options.collect_stats {
            let result = renderer.render_with_stats(tree);
            Extraction::canonical(result.content).with_stats(result.stats)
        } else {
            Extraction::canonical(renderer.render(tree))
        };

        Ok(extraction.with_encoding(encoding, confident))
    }
}
