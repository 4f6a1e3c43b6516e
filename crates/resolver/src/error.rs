//! Error types for resolver operations.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while resolving versions against remote manifests.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The HTTP request itself failed (DNS, TLS, connection reset).
    #[error("Failed to fetch {url}: {source}")]
    #[diagnostic(code(chromeup::resolver::http))]
    Http {
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
        /// The URL that was requested.
        url: String,
    },

    /// The server answered with a non-success status.
    #[error("Failed to fetch {url}: server returned {status}")]
    #[diagnostic(code(chromeup::resolver::status))]
    UnexpectedStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The manifest body did not match the expected shape.
    #[error("Failed to parse manifest from {url}: {source}")]
    #[diagnostic(code(chromeup::resolver::manifest))]
    Manifest {
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
        /// The URL the manifest came from.
        url: String,
    },

    /// Unsupported platform or malformed version.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] chromeup_core::Error),
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, Error>;
