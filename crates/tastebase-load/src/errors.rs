use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the loaders and stores.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Core(#[from] tastebase_core::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("missing input file {0}")]
    MissingInput(PathBuf),
    #[error("constraint violated on {table}: {message}")]
    Constraint { table: String, message: String },
    #[error("failed to load {file}: {source}")]
    Chunk {
        file: String,
        #[source]
        source: Box<LoadError>,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    /// Absent files become `MissingInput`; everything else stays a core error.
    pub(crate) fn from_core(err: tastebase_core::Error) -> Self {
        match err {
            tastebase_core::Error::Io { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                LoadError::MissingInput(path)
            }
            other => LoadError::Core(other),
        }
    }

    /// Integrity violations reported by Postgres (SQLSTATE class 23) become
    /// `Constraint`; other database errors pass through.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().is_some_and(|code| code.starts_with("23")) {
                return LoadError::Constraint {
                    table: db.table().unwrap_or("unknown").to_string(),
                    message: db.message().to_string(),
                };
            }
        }
        LoadError::Database(err)
    }

    pub(crate) fn in_chunk(self, file: String) -> Self {
        LoadError::Chunk {
            file,
            source: Box::new(self),
        }
    }
}
