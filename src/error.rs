use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can abort a run. The first error stops the batch; only
/// `main` turns one of these into an exit code.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read key file {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid character {ch:?} in publishing key from {origin}")]
    InvalidKey { origin: String, ch: char },

    /// Non-success status on a GET endpoint (key generation, token fetch).
    /// `StatusCode` displays as code plus reason phrase.
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },

    #[error("no generated key in response from {url}")]
    MissingKey { url: String },

    #[error("no csrf token in response from {url}")]
    MissingToken { url: String },

    #[error("uploading {}: server answered {status}", .path.display())]
    Upload { path: PathBuf, status: StatusCode },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("reading file list from stdin: {0}")]
    Stdin(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
