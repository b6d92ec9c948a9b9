//! Document decoding and CSV reading.

mod decode;
mod options;
mod reader;

pub use decode::{decode_bytes, resolve_encoding};
pub use options::CsvOptions;
pub use reader::{ParsedTable, parse_bytes, parse_text};
