//! Error types for the cross-reference engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the store, the directory scanner and the classifier.
///
/// Extraction itself never fails; detection and presence only propagate
/// store failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A row referenced by id does not exist in the store.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    /// The AI classifier could not be reached or answered nonsense.
    #[error("Classifier error: {message}")]
    Classifier { message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Classifier {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
