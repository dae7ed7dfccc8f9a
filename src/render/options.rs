//! Rendering options and configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::parser::resolve_label;

/// A set of lowercase tag names.
pub type TagSet = BTreeSet<String>;

/// Tags whose own text is never visible.
pub const DISALLOWED_TAGS: &[&str] = &[
    "style", "script", "head", "title", "html", "meta", "link", "body",
];

/// Tags that flow within a line and are unwrapped before text assembly.
pub const INLINE_TAGS: &[&str] = &[
    "b", "big", "i", "small", "tt", "abbr", "acronym", "cite", "code", "dfn", "em", "kbd",
    "strong", "samp", "var", "a", "bdo", "br", "img", "map", "object", "q", "span", "sub", "sup",
    "button", "input", "label", "select", "textarea",
];

/// Tags whose content never counts as text, wherever they appear.
pub const OPAQUE_TAGS: &[&str] = &["script", "style", "template"];

fn tag_set(tags: &[&str]) -> TagSet {
    tags.iter().map(|t| t.to_string()).collect()
}

/// Options for turning a document tree into text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Tags whose own text is suppressed (descendants are still evaluated)
    pub disallowed_tags: TagSet,

    /// Inline-level tags that get unwrapped into their parent
    pub inline_tags: TagSet,

    /// Tags whose whole subtree is left out of extracted text
    pub opaque_tags: TagSet,

    /// Column separator for ASCII tables
    pub column_separator: String,

    /// Fill string for ASCII table borders
    pub border_fill: String,

    /// Label of the output encoding
    pub output_encoding: String,

    /// Skip the descendants of a node whose whole subtree was emitted
    pub dedupe_nested: bool,

    /// Normalize the assembled text to Unicode NFC
    pub normalize_unicode: bool,
}

impl TextOptions {
    /// Create new text options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the disallowed tag set.
    pub fn with_disallowed_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.disallowed_tags = tags.into_iter().map(|t| t.into().to_lowercase()).collect();
        self
    }

    /// Replace the inline tag set.
    pub fn with_inline_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.inline_tags = tags.into_iter().map(|t| t.into().to_lowercase()).collect();
        self
    }

    /// Replace the opaque tag set.
    pub fn with_opaque_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.opaque_tags = tags.into_iter().map(|t| t.into().to_lowercase()).collect();
        self
    }

    /// Set the table column separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.column_separator = separator.into();
        self
    }

    /// Set the table border fill.
    pub fn with_border_fill(mut self, fill: impl Into<String>) -> Self {
        self.border_fill = fill.into();
        self
    }

    /// Set the output encoding label.
    pub fn with_output_encoding(mut self, label: impl Into<String>) -> Self {
        self.output_encoding = label.into();
        self
    }

    /// Enable or disable nested-text deduplication.
    pub fn with_dedupe_nested(mut self, dedupe: bool) -> Self {
        self.dedupe_nested = dedupe;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Check that the options can be used.
    pub fn validate(&self) -> Result<()> {
        resolve_label(&self.output_encoding)?;
        if self.column_separator.contains('\n') || self.border_fill.contains('\n') {
            return Err(Error::Config(
                "table separator and border must not contain newlines".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            disallowed_tags: tag_set(DISALLOWED_TAGS),
            inline_tags: tag_set(INLINE_TAGS),
            opaque_tags: tag_set(OPAQUE_TAGS),
            column_separator: " | ".to_string(),
            border_fill: "-".to_string(),
            output_encoding: "utf-8".to_string(),
            dedupe_nested: false,
            normalize_unicode: false,
        }
    }
}
