//! Byte decoding with a fixed encoding.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{IngestError, Result};

/// Resolves an encoding label.
///
/// Accepts WHATWG labels (`latin1`, `iso-8859-1`, `utf-8`) as well as the
/// spellings with an extra separator (`latin-1`, `utf_8`).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let trimmed = label.trim();
    if let Some(encoding) = Encoding::for_label(trimmed.as_bytes()) {
        return Ok(encoding);
    }
    let compact: String = trimmed
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();
    Encoding::for_label(compact.as_bytes()).ok_or_else(|| IngestError::UnsupportedEncoding {
        label: label.to_string(),
    })
}

/// Decodes a document.
///
/// A byte order mark overrides `encoding` and is removed. Malformed sequences
/// become U+FFFD rather than failing the document.
pub fn decode_bytes<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(
            encoding = used.name(),
            "replaced malformed byte sequences while decoding"
        );
    }
    text
}
