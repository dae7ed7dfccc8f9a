//! HTML parsing and encoding normalization.

mod dom;
mod encoding;

pub use dom::{parse_html, HtmlParser};
pub use encoding::{decode, decode_bytes, encode, resolve_label, Decoded, Payload};
