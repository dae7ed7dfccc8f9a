//! Text normalization helpers shared by the render stages.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Collapse every whitespace run to one space and trim both ends.
///
/// Idempotent: normalizing already-normalized text returns it unchanged.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Normalize text to Unicode NFC.
pub fn normalize_unicode(text: &str) -> String {
    text.nfc().collect()
}
