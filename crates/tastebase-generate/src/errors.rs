use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the generators.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("missing input file {0}")]
    MissingInput(PathBuf),
    #[error(transparent)]
    Core(#[from] tastebase_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    /// Classify a core error: absent files become `MissingInput`, settings
    /// errors stay `InvalidConfig`.
    pub(crate) fn from_core(err: tastebase_core::Error) -> Self {
        match err {
            tastebase_core::Error::Io { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                GenerationError::MissingInput(path)
            }
            tastebase_core::Error::InvalidConfig(message) => {
                GenerationError::InvalidConfig(message)
            }
            other => GenerationError::Core(other),
        }
    }
}
