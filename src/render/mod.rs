//! Rendering of parsed HTML trees to plain text.

mod cleanup;
mod inline;
mod json;
mod options;
mod result;
mod table;
mod text;
mod visibility;

pub use cleanup::{normalize_unicode, normalize_whitespace};
pub use inline::flatten_inlines;
pub use json::{to_json, JsonFormat};
pub use options::{TagSet, TextOptions, DISALLOWED_TAGS, INLINE_TAGS, OPAQUE_TAGS};
pub use result::{ExtractionStats, RenderResult};
pub use table::TableTranscoder;
pub use text::{assemble, to_text, to_text_with_stats, TextRenderer};
pub use visibility::{is_visible, node_text, visible_texts, VisibleText};
