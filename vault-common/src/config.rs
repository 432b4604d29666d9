//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_ENV_VAR: &str = "VAULT_ROOT";

/// Settings file name, looked up inside the root folder and the user config dir
pub const SETTINGS_FILE_NAME: &str = "vault.toml";

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `VAULT_ROOT` environment variable
/// 3. `root_folder` key of the TOML settings file
/// 4. OS-dependent compiled default
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root folder given on the command line, if any
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Settings file to consult instead of the per-user default
    pub fn with_config_file(mut self, config_file: Option<PathBuf>) -> Self {
        self.config_file = config_file;
        self
    }

    /// Resolve the root folder. Never fails: an unreadable settings file is
    /// logged and skipped.
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!(path = %path.display(), "Root folder from command line");
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
            if !path.is_empty() {
                debug!(path = %path, "Root folder from {}", ROOT_ENV_VAR);
                return PathBuf::from(path);
            }
        }

        let config_file = self.config_file.clone().or_else(user_settings_file);
        if let Some(config_file) = config_file.filter(|p| p.exists()) {
            match ImportSettings::load(&config_file) {
                Ok(settings) => {
                    if let Some(root) = settings.root_folder {
                        debug!(path = %root.display(), "Root folder from settings file");
                        return root;
                    }
                }
                Err(e) => warn!("Ignoring settings file for root folder resolution: {}", e),
            }
        }

        default_root_folder()
    }
}

/// Per-user settings file (`<config dir>/mediavault/vault.toml`)
fn user_settings_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mediavault").join(SETTINGS_FILE_NAME))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\mediavault
        dirs::data_local_dir()
            .map(|d| d.join("mediavault"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\mediavault"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/mediavault
        dirs::data_dir()
            .map(|d| d.join("mediavault"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/mediavault"))
    } else {
        // ~/.local/share/mediavault
        dirs::data_local_dir()
            .map(|d| d.join("mediavault"))
            .unwrap_or_else(|| PathBuf::from("./mediavault_data"))
    }
}

/// Settings for the import tooling, read from `vault.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Root folder override (tier 3 of root folder resolution)
    pub root_folder: Option<PathBuf>,
    /// Catalog database file; relative paths are taken from the root folder
    pub database_file: PathBuf,
    /// Deadline for a single catalog existence lookup
    pub lookup_timeout_ms: u64,
    /// Cache existence answers per (kind, id) for the duration of one run
    pub memoize_lookups: bool,
    /// Base directory for relative resource paths in import batches
    pub resource_base_dir: Option<PathBuf>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            root_folder: None,
            database_file: PathBuf::from("vault.db"),
            lookup_timeout_ms: 5000,
            memoize_lookups: false,
            resource_base_dir: None,
        }
    }
}

impl ImportSettings {
    /// Parse settings from TOML text. `origin` is only used for error reporting.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let settings: ImportSettings = toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text, path)
    }

    /// Load settings, falling back to defaults when the file is absent.
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                path = %path.display(),
                "Settings file not found, using defaults"
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Catalog database location for a given root folder
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        if self.database_file.is_absolute() {
            self.database_file.clone()
        } else {
            root_folder.join(&self.database_file)
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.lookup_timeout_ms == 0 {
            return Err(Error::Config(
                "lookup_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.database_file.as_os_str().is_empty() {
            return Err(Error::Config("database_file must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ImportSettings::default();
        assert_eq!(settings.database_file, PathBuf::from("vault.db"));
        assert_eq!(settings.lookup_timeout(), Duration::from_secs(5));
        assert!(!settings.memoize_lookups);
        assert!(settings.resource_base_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings =
            ImportSettings::from_toml_str("memoize_lookups = true\n", Path::new("inline")).unwrap();
        assert!(settings.memoize_lookups);
        assert_eq!(settings.lookup_timeout_ms, 5000);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ImportSettings::from_toml_str("lookup_timeout_ms = 0\n", Path::new("inline"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml_reports_path() {
        let result = ImportSettings::from_toml_str("lookup_timeout_ms = \"soon\"", Path::new("bad.toml"));
        match result {
            Err(Error::ConfigParse { path, .. }) => assert_eq!(path, PathBuf::from("bad.toml")),
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_database_path_relative_and_absolute() {
        let root = Path::new("/srv/vault");
        let mut settings = ImportSettings::default();
        assert_eq!(settings.database_path(root), PathBuf::from("/srv/vault/vault.db"));

        settings.database_file = PathBuf::from("/data/catalog.db");
        assert_eq!(settings.database_path(root), PathBuf::from("/data/catalog.db"));
    }
}
