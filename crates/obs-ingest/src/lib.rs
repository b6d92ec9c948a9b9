//! Attendance data ingestion.
//!
//! This crate fetches delimited-text documents and loads them into one
//! [`RawTable`](obs_model::RawTable).
//!
//! # Features
//!
//! - **Sources**: fixed URL, cloud-storage folder, local files and folders, in-memory uploads
//! - **Decoding**: one fixed encoding per load (Latin-1 by default)
//! - **Permissive reading**: malformed rows are skipped, never fatal
//! - **Concatenation**: documents are stacked in source order, columns unioned by name
//!
//! # Example
//!
//! ```ignore
//! use obs_ingest::{CsvOptions, Ingestor, ReqwestClient, Source};
//!
//! let ingestor = Ingestor::new(CsvOptions::default())
//!     .with_http(Box::new(ReqwestClient::new()?));
//! let result = ingestor.ingest(&[Source::Url("https://example.org/atendimentos.csv".into())])?;
//! println!("{} rows", result.table.height());
//! ```

mod discovery;
mod document;
mod drive;
mod error;
mod http;
mod ingest;
mod service_account;
mod source;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use document::{
    CsvOptions, ParsedTable, decode_bytes, parse_bytes, parse_text, resolve_encoding,
};

// === Sources ===
pub use discovery::list_csv_files;
pub use drive::{
    DRIVE_FILES_URL, DriveFile, StaticToken, TokenFile, TokenProvider, download_file,
    download_url, list_folder, listing_url,
};
pub use http::{HttpClient, ReqwestClient};
pub use service_account::{DRIVE_READONLY_SCOPE, ServiceAccountKey, ServiceAccountToken};
pub use source::Source;

// === Loading ===
pub use ingest::{IngestResult, Ingestor};
