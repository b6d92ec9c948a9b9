//! CSV file discovery for upload folders.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::unavailable(
            dir.display(),
            "directory not found",
        ));
    }

    let entries =
        std::fs::read_dir(dir).map_err(|e| IngestError::unavailable(dir.display(), e))?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::unavailable(dir.display(), e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        // Check for .csv extension (case-insensitive)
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_csv_files_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["marco.csv", "janeiro.CSV", "notas.txt"] {
            std::fs::write(dir.path().join(name), "A\n1\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("arquivo.csv")).unwrap();

        let files = list_csv_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
            .collect();

        assert_eq!(names, vec!["janeiro.CSV", "marco.csv"]);
    }

    #[test]
    fn test_list_csv_files_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(list_csv_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_list_csv_files_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("dados.csv");
        std::fs::write(&file_path, "data").unwrap();

        let result = list_csv_files(&file_path);
        assert!(matches!(
            result,
            Err(IngestError::SourceUnavailable { .. })
        ));
    }
}
