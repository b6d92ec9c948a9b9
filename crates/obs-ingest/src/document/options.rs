//! Parsing options shared by every source of a load.

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

use super::decode::resolve_encoding;

/// Text encoding and delimiter used for every document of a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Encoding label, e.g. `latin-1` or `utf-8`.
    pub encoding: String,
    pub delimiter: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            encoding: "latin-1".to_string(),
            delimiter: ',',
        }
    }
}

impl CsvOptions {
    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn resolve_encoding(&self) -> Result<&'static Encoding> {
        resolve_encoding(&self.encoding)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(IngestError::InvalidDelimiter {
                value: self.delimiter,
            })
        }
    }
}
