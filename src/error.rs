use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradeError {
    #[error("grade store unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to persist grade: {0}")]
    Persistence(#[source] rusqlite::Error),

    #[error("{0}")]
    Validation(String),
}

pub type GradeResult<T> = Result<T, GradeError>;

impl GradeError {
    pub fn unavailable(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        GradeError::StorageUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        GradeError::Validation(message.into())
    }

    /// Stable code reported to IPC callers.
    pub fn code(&self) -> &'static str {
        match self {
            GradeError::StorageUnavailable { .. } => "storage_unavailable",
            GradeError::Persistence(_) => "persistence_error",
            GradeError::Validation(_) => "validation_error",
        }
    }
}
