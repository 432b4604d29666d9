//! Common error types for Media Vault

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for Media Vault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or touching the catalog database
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog database error (wraps sqlx::Error)
    #[error("Catalog database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem access failed for a specific path
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration value missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid TOML for the expected layout
    #[error("Invalid configuration file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Read-only access was requested for a catalog that does not exist yet
    #[error("Catalog not found: {}", .0.display())]
    CatalogMissing(PathBuf),
}

impl Error {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
