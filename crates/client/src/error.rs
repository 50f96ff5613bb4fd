//! Typed error enum for the client crate.

use std::path::PathBuf;

use medassist_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {message}")]
    HttpStatus { code: u16, message: String },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("local store I/O error at {}: {source}", .path.display())]
    LocalStoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("local store format error: {0}")]
    LocalStoreFormat(#[from] serde_json::Error),
    /// Report failed the same checks the server applies.
    #[error("{0}")]
    InvalidReport(#[from] ValidationError),
}

impl ClientError {
    /// Whether a price report submission should be kept locally instead.
    ///
    /// Transport failures and server errors qualify; a 4xx means the server
    /// rejected the report and storing it would only hide the problem.
    #[must_use]
    pub fn is_fallback_eligible(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => *code >= 500,
            Self::ClientInit(_)
            | Self::LocalStoreIo { .. }
            | Self::LocalStoreFormat(_)
            | Self::InvalidReport(_) => false,
        }
    }
}
