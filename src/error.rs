use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapperError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Only raised in strict numeric mode.
    #[error("row {row}: column {column} is not a number: {value:?}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row count mismatch: {products} product rows but {entries} price book entry rows")]
    RowCountMismatch { products: usize, entries: usize },
}

impl MapperError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MapperError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
