use std::path::PathBuf;

use thiserror::Error;

/// Core error type shared across Tastebase crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings are missing, malformed, or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem failure on a specific artifact.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An artifact could not be encoded or decoded.
    #[error("json error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The optional TOML settings file is malformed.
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results returned by Tastebase crates.
pub type Result<T> = std::result::Result<T, Error>;
