use std::path::PathBuf;

use thiserror::Error;

/// Core error type for ProposalGen configuration and input handling.
#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),
    #[error("missing secret: {0}")]
    MissingSecret(String),
    #[error("I/O error while reading {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    InvalidTitle(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProposalError {
    pub fn config_io(path: PathBuf, source: std::io::Error) -> Self {
        Self::ConfigIo { path, source }
    }
}
