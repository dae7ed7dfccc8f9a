//! Encoding normalization.
//!
//! Everything entering the pipeline is decoded to canonical Unicode text
//! once, at the boundary, and everything leaving it is encoded to one fixed
//! output encoding. Neither direction fails: undecodable input degrades to
//! lossy UTF-8 and unrepresentable output characters are dropped.

use chardetng::EncodingDetector;
use encoding_rs::{EncoderResult, Encoding, UTF_8};

use crate::error::{Error, Result};

/// A payload handed over by an extraction step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Bytes in an unknown encoding
    Raw(Vec<u8>),
    /// Already-decoded text
    Canonical(String),
}

impl Payload {
    /// Check if the payload holds nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Raw(bytes) => bytes.is_empty(),
            Payload::Canonical(text) => text.is_empty(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Canonical(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Raw(bytes)
    }
}

/// Result of decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Canonical text
    pub text: String,

    /// Encoding used, `None` when the input was already text or empty
    pub encoding: Option<&'static Encoding>,

    /// False when detection was unsure and the text was decoded leniently
    pub confident: bool,
}

impl Decoded {
    fn sure(text: String, encoding: Option<&'static Encoding>) -> Self {
        Self {
            text,
            encoding,
            confident: true,
        }
    }

    /// Name of the encoding used, if any.
    pub fn encoding_name(&self) -> Option<&'static str> {
        self.encoding.map(Encoding::name)
    }
}

/// Decode a payload to canonical text.
///
/// Canonical payloads pass through untouched; raw ones go through
/// [`decode_bytes`].
pub fn decode(payload: Payload, declared: Option<&str>) -> Decoded {
    match payload {
        Payload::Canonical(text) => Decoded::sure(text, None),
        Payload::Raw(bytes) => decode_bytes(&bytes, declared),
    }
}

/// Decode raw bytes to canonical text.
///
/// A byte-order mark wins over everything; then a recognized `declared`
/// label; then statistical detection. If detection is not confident the
/// bytes are decoded as UTF-8 with invalid sequences replaced.
pub fn decode_bytes(bytes: &[u8], declared: Option<&str>) -> Decoded {
    if bytes.is_empty() {
        return Decoded::sure(String::new(), None);
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        log::debug!("Decoding as {} (byte-order mark)", encoding.name());
        return Decoded::sure(decode_with(encoding, &bytes[bom_len..]), Some(encoding));
    }

    if let Some(label) = declared {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => {
                log::debug!("Decoding as {} (declared)", encoding.name());
                return Decoded::sure(decode_with(encoding, bytes), Some(encoding));
            }
            None => log::debug!("Ignoring unknown declared encoding {:?}", label),
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let (encoding, confident) = detector.guess_assess(None, true);

    if confident {
        log::debug!("Decoding as {} (detected)", encoding.name());
        Decoded::sure(decode_with(encoding, bytes), Some(encoding))
    } else {
        log::debug!(
            "No confident encoding (best guess {}), decoding leniently",
            encoding.name()
        );
        decode_leniently(bytes)
    }
}

/// UTF-8 with invalid sequences replaced, flagged as not confident.
fn decode_leniently(bytes: &[u8]) -> Decoded {
    Decoded {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: Some(UTF_8),
        confident: false,
    }
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        log::debug!("Replaced malformed {} sequences", encoding.name());
    }
    text.into_owned()
}

/// Encode text, dropping characters the target cannot represent.
pub fn encode(text: &str, target: &'static Encoding) -> Vec<u8> {
    let target = target.output_encoding();
    if target == UTF_8 {
        return text.as_bytes().to_vec();
    }

    let mut encoder = target.new_encoder();
    let mut output = Vec::with_capacity(text.len());
    let mut remaining = text;
    let mut dropped = 0usize;

    loop {
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut output, true);
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {
                let needed = encoder
                    .max_buffer_length_from_utf8_without_replacement(remaining.len())
                    .unwrap_or(remaining.len() * 4 + 16);
                output.reserve(needed);
            }
            // The unmappable character has been consumed; keep going without it
            EncoderResult::Unmappable(_) => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {} characters not representable in {}", dropped, target.name());
    }
    output
}

/// Look up an encoding by label (e.g. `"utf-8"`, `"shift_jis"`).
pub fn resolve_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}
