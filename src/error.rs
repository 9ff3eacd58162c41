//! Error types for manifest loading and generation.
//!
//! Load errors never reach callers of the loader: they are logged and turned
//! into display states. They exist so sources can report what went wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while fetching or parsing a subject's file listing.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The request could not be completed (connection, DNS, timeout).
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
    /// The body was not a manifest of an accepted shape.
    #[error("malformed manifest: {0}")]
    Malformed(String),
    /// A local subject directory could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The subjects root could not be turned into a base URL or path.
    #[error("invalid subjects root: {0}")]
    InvalidRoot(String),
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl LoadError {
    /// Whether this failure means "not found" rather than a broken request.
    pub fn is_not_found(&self) -> bool {
        match self {
            LoadError::Status { status, .. } => *status == 404,
            LoadError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Failure while writing a subject manifest.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Existing manifest is a flat list; only categorized manifests are maintained.
    #[error("{} is not a categorized manifest", .0.display())]
    NotCategorized(PathBuf),
}
