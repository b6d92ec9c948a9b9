//! Settings file.
//!
//! Settings live in the platform configuration folder unless `--config`
//! points elsewhere:
//! - macOS: ~/Library/Application Support/br.observatorio.Observatorio/
//! - Windows: %APPDATA%/observatorio/Observatorio/config/
//! - Linux: ~/.config/observatorio/

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use obs_ingest::CsvOptions;
use obs_model::{ColumnMap, Limit};
use obs_transform::{DateOrder, NormalizeOptions};
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "br";
const APP_ORG: &str = "observatorio";
const APP_NAME: &str = "Observatorio";
const CONFIG_FILENAME: &str = "settings.toml";

/// Where records come from when no source is given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Files and directories listed in `paths`.
    #[default]
    Local,
    /// A fixed CSV URL.
    Url,
    /// Every CSV in a Drive folder.
    DriveFolder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub url: Option<String>,
    pub drive_folder: Option<String>,
    /// File holding the Drive bearer token.
    pub token_file: Option<PathBuf>,
    /// Service-account JSON key exchanged for a Drive token.
    pub service_account: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
}

/// How report tables are arranged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Sections side by side.
    #[default]
    Wide,
    /// One section after another.
    Compact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub layout: Layout,
    pub top_procedures: Limit,
    pub top_professionals: Limit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Seconds a loaded snapshot stays fresh.
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Users allowed to see the data. Empty disables the login gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// User name to lowercase hex SHA-256 digest of the password.
    pub users: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub date_order: DateOrder,
    pub source: SourceSettings,
    pub display: DisplaySettings,
    pub cache: CacheSettings,
    pub csv: CsvOptions,
    pub columns: ColumnMap,
    pub auth: AuthSettings,
}

impl Settings {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            columns: self.columns.clone(),
            date_order: self.date_order,
        }
    }
}

/// Default settings file location.
///
/// Returns `None` if the platform-specific directory cannot be determined.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Loads settings from `path`, or from the default location.
///
/// Returns default settings if the file is missing or cannot be parsed.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match settings_path() {
            Some(path) => path,
            None => {
                tracing::warn!("could not determine settings path, using defaults");
                return Settings::default();
            }
        },
    };

    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse settings, using defaults");
                Settings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Settings::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read settings, using defaults");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let mut settings = Settings::default();
        settings.display.top_procedures = Limit::All;
        settings.source.kind = SourceKind::DriveFolder;
        settings.source.drive_folder = Some("1AbC".to_string());
        settings.source.service_account = Some(PathBuf::from("/etc/observatorio/conta.json"));
        settings
            .auth
            .users
            .insert("gestor".to_string(), "ab".repeat(32));

        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Settings = toml::from_str(
            r#"
            date_order = "month_first"

            [display]
            layout = "compact"
            top_professionals = 20

            [columns]
            unit = "Unidade de Saúde"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.date_order, DateOrder::MonthFirst);
        assert_eq!(parsed.display.layout, Layout::Compact);
        assert_eq!(parsed.display.top_professionals, Limit::Top(20));
        assert_eq!(parsed.display.top_procedures, Limit::Top(10));
        assert_eq!(parsed.columns.unit, "Unidade de Saúde");
        assert_eq!(parsed.columns.age, "Idade");
        assert_eq!(parsed.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(parsed.csv.encoding, "latin-1");
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[display\nlayout = ").unwrap();
        assert_eq!(load_settings(Some(&path)), Settings::default());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(load_settings(Some(&path)), Settings::default());
    }
}
