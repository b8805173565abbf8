use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid station format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, PresetError>;
