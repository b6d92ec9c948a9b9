//! Loading and concatenating sources into one raw table.

use std::fs;
use std::path::Path;
use std::time::Instant;

use obs_model::RawTable;
use tracing::{debug, info, info_span, warn};

use crate::discovery::list_csv_files;
use crate::document::{CsvOptions, parse_bytes};
use crate::drive::{TokenProvider, download_file, list_folder};
use crate::error::{IngestError, Result};
use crate::http::HttpClient;
use crate::source::Source;

/// Outcome of a successful load.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub table: RawTable,
    /// Number of documents read across all sources.
    pub documents: usize,
    /// Rows dropped by the permissive reader across all documents.
    pub skipped_rows: usize,
}

/// Reads sources with a fixed encoding and delimiter.
pub struct Ingestor {
    options: CsvOptions,
    http: Option<Box<dyn HttpClient>>,
    tokens: Option<Box<dyn TokenProvider>>,
}

impl Ingestor {
    /// An ingestor for local sources only.
    pub fn new(options: CsvOptions) -> Self {
        Self {
            options,
            http: None,
            tokens: None,
        }
    }

    /// Enables URL and Drive sources.
    #[must_use]
    pub fn with_http(mut self, client: Box<dyn HttpClient>) -> Self {
        self.http = Some(client);
        self
    }

    /// Sets the credential used for Drive folders.
    #[must_use]
    pub fn with_token_provider(mut self, tokens: Box<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Loads every source in order and concatenates the documents.
    ///
    /// Fails with `SourceUnavailable` on the first source that cannot be
    /// read, and with `EmptyResult` when no data row survives.
    pub fn ingest(&self, sources: &[Source]) -> Result<IngestResult> {
        let span = info_span!("ingest", sources = sources.len());
        let _guard = span.enter();
        let start = Instant::now();

        // Fail on configuration problems before touching any source.
        self.options.resolve_encoding()?;
        self.options.delimiter_byte()?;

        let mut tables = Vec::new();
        let mut skipped_rows = 0usize;

        for source in sources {
            for (name, bytes) in self.fetch(source)? {
                let parsed = parse_bytes(&bytes, &self.options)?;
                debug!(
                    source = %name,
                    kind = source.kind(),
                    rows = parsed.table.height(),
                    columns = parsed.table.width(),
                    skipped = parsed.skipped_rows,
                    "parsed document"
                );
                if parsed.skipped_rows > 0 {
                    warn!(
                        source = %name,
                        skipped = parsed.skipped_rows,
                        "skipped malformed rows"
                    );
                }
                skipped_rows += parsed.skipped_rows;
                tables.push(parsed.table);
            }
        }

        let documents = tables.len();
        let table = RawTable::concat(tables);
        if table.is_empty() {
            return Err(IngestError::EmptyResult { documents });
        }

        info!(
            documents,
            rows = table.height(),
            columns = table.width(),
            skipped_rows,
            duration_ms = start.elapsed().as_millis(),
            "ingest complete"
        );

        Ok(IngestResult {
            table,
            documents,
            skipped_rows,
        })
    }

    /// Resolves a source into named documents.
    fn fetch(&self, source: &Source) -> Result<Vec<(String, Vec<u8>)>> {
        match source {
            Source::File(path) => Ok(vec![read_file(path)?]),
            Source::Directory(dir) => list_csv_files(dir)?
                .iter()
                .map(|path| read_file(path))
                .collect(),
            Source::Bytes { name, data } => Ok(vec![(name.clone(), data.clone())]),
            Source::Url(url) => {
                let client = self.http_client(source)?;
                Ok(vec![(url.clone(), client.get(url, None)?)])
            }
            Source::DriveFolder { folder_id } => {
                let client = self.http_client(source)?;
                let tokens = self
                    .tokens
                    .as_deref()
                    .ok_or_else(|| IngestError::unavailable(source, "no drive credential configured"))?;
                let token = tokens.bearer_token(client)?;
                list_folder(client, &token, folder_id)?
                    .into_iter()
                    .map(|file| {
                        let bytes = download_file(client, &token, &file)?;
                        Ok((file.name, bytes))
                    })
                    .collect()
            }
        }
    }

    fn http_client(&self, source: &Source) -> Result<&dyn HttpClient> {
        self.http
            .as_deref()
            .ok_or_else(|| IngestError::unavailable(source, "no HTTP client configured"))
    }
}

fn read_file(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = fs::read(path).map_err(|e| IngestError::unavailable(path.display(), e))?;
    Ok((path.display().to_string(), bytes))
}
