//! Cloud-storage folder source (Google Drive v3 API).
//!
//! A folder is listed for CSV files and each file is downloaded with
//! `alt=media`. Both calls carry a bearer token from a [`TokenProvider`].

use std::fs;
use std::path::PathBuf;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{IngestError, Result};
use crate::http::HttpClient;

/// Files endpoint of the Drive v3 API.
pub const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// Supplies the bearer token for authenticated downloads.
///
/// Providers that exchange a credential for a token do so through `client`.
pub trait TokenProvider {
    fn bearer_token(&self, client: &dyn HttpClient) -> Result<String>;
}

/// A token known up front.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self, _client: &dyn HttpClient) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// A token read from a file on every load, so an external refresher can
/// rotate it.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the trimmed token.
    pub fn read(&self) -> Result<String> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| IngestError::unavailable(self.path.display(), e))?;
        let token = content.trim();
        if token.is_empty() {
            return Err(IngestError::unavailable(
                self.path.display(),
                "token file is empty",
            ));
        }
        Ok(token.to_string())
    }
}

impl TokenProvider for TokenFile {
    fn bearer_token(&self, _client: &dyn HttpClient) -> Result<String> {
        self.read()
    }
}

/// A file entry from a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Escapes a value for a single-quoted Drive query string.
fn quote_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds the listing URL for CSV files in a folder.
pub fn listing_url(folder_id: &str, page_token: Option<&str>) -> Result<String> {
    let query = format!(
        "'{}' in parents and mimeType='text/csv'",
        quote_query_value(folder_id)
    );
    let mut params = vec![
        ("q", query),
        ("fields", "nextPageToken, files(id, name)".to_string()),
    ];
    if let Some(token) = page_token {
        params.push(("pageToken", token.to_string()));
    }
    Url::parse_with_params(DRIVE_FILES_URL, &params)
        .map(String::from)
        .map_err(|e| IngestError::unavailable(format!("drive folder {folder_id}"), e))
}

/// Builds the download URL for a file's content.
pub fn download_url(file_id: &str) -> String {
    format!("{DRIVE_FILES_URL}/{file_id}?alt=media")
}

/// Lists the CSV files of a folder, following pagination.
pub fn list_folder(client: &dyn HttpClient, token: &str, folder_id: &str) -> Result<Vec<DriveFile>> {
    let mut files = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let url = listing_url(folder_id, page_token.as_deref())?;
        let body = client.get(&url, Some(token))?;
        let page: FileList = serde_json::from_slice(&body).map_err(|e| {
            IngestError::unavailable(format!("drive folder {folder_id}"), e)
        })?;
        files.extend(page.files);

        match page.next_page_token {
            Some(next) if !next.is_empty() => page_token = Some(next),
            _ => break,
        }
    }

    tracing::debug!(folder_id, file_count = files.len(), "listed drive folder");
    Ok(files)
}

/// Downloads one file's content.
pub fn download_file(client: &dyn HttpClient, token: &str, file: &DriveFile) -> Result<Vec<u8>> {
    client
        .get(&download_url(&file.id), Some(token))
        .map_err(|e| match e {
            IngestError::SourceUnavailable { reason, .. } => IngestError::SourceUnavailable {
                name: file.name.clone(),
                reason,
            },
            other => other,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_encodes_query() {
        let url = listing_url("abc123", None).unwrap();
        assert!(url.starts_with(DRIVE_FILES_URL));
        assert!(url.contains("abc123"));
        assert!(!url.contains(' '));
        assert!(!url.contains("pageToken"));
    }

    #[test]
    fn test_listing_url_with_page_token() {
        let url = listing_url("abc123", Some("next-1")).unwrap();
        assert!(url.contains("pageToken=next-1"));
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            download_url("f1"),
            "https://www.googleapis.com/drive/v3/files/f1?alt=media"
        );
    }

    #[test]
    fn test_token_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  ya29.token \n").unwrap();
        assert_eq!(TokenFile::new(&path).read().unwrap(), "ya29.token");

        std::fs::write(&path, "\n").unwrap();
        assert!(TokenFile::new(&path).read().is_err());
    }

    #[test]
    fn test_folder_id_quotes_are_escaped() {
        assert_eq!(quote_query_value("abc"), "abc");
        assert_eq!(quote_query_value("o'brien"), "o\\'brien");
        assert_eq!(quote_query_value("a\\b"), "a\\\\b");

        let url = listing_url("o'brien", None).unwrap();
        let query = Url::parse(&url)
            .unwrap()
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        assert_eq!(query, "'o\\'brien' in parents and mimeType='text/csv'");
    }
}
