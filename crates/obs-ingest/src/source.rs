//! Source kinds an ingest can read from.

use std::fmt;
use std::path::PathBuf;

/// Where attendance documents come from.
#[derive(Clone, PartialEq, Eq)]
pub enum Source {
    /// A delimited-text document at a fixed HTTP(S) URL.
    Url(String),
    /// Every CSV file of a cloud-storage folder (needs a token provider).
    DriveFolder { folder_id: String },
    /// One local or uploaded file.
    File(PathBuf),
    /// Every `*.csv` file of a local folder, by file name.
    Directory(PathBuf),
    /// An in-memory upload.
    Bytes { name: String, data: Vec<u8> },
}

impl Source {
    pub fn bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Source::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Url(_) => "url",
            Source::DriveFolder { .. } => "drive_folder",
            Source::File(_) => "file",
            Source::Directory(_) => "directory",
            Source::Bytes { .. } => "upload",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::DriveFolder { folder_id } => write!(f, "drive folder {folder_id}"),
            Source::File(path) | Source::Directory(path) => write!(f, "{}", path.display()),
            Source::Bytes { name, .. } => f.write_str(name),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Bytes { name, data } => f
                .debug_struct("Bytes")
                .field("name", name)
                .field("len", &data.len())
                .finish(),
            other => write!(f, "{}({other})", other.kind()),
        }
    }
}
