use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefweightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid asset graph {path}: {message}")]
    Graph { path: PathBuf, message: String },

    #[error("Invalid asset key '{input}': {reason}")]
    KeyParse { input: String, reason: String },
}
