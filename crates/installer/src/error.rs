//! Error types for installer operations.

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while installing a browser or driver.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No build exists for the requested version on the target platform.
    /// Distinct from network failures so CI users can tell "doesn't exist"
    /// apart from "network broke".
    #[error("Version {version} is not available for {platform}")]
    #[diagnostic(
        code(chromeup::installer::version_not_found),
        help("check https://googlechromelabs.github.io/chrome-for-testing/ for published builds")
    )]
    VersionNotFound {
        /// The requested version spec.
        version: String,
        /// The target platform.
        platform: String,
    },

    /// A download request failed.
    #[error("Failed to download {url}: {source}")]
    #[diagnostic(code(chromeup::installer::download))]
    Download {
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
        /// The URL being downloaded.
        url: String,
    },

    /// A download was answered with a non-success status.
    #[error("Failed to download {url}: server returned {status}")]
    #[diagnostic(code(chromeup::installer::download_status))]
    DownloadStatus {
        /// The URL being downloaded.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// An archive could not be unpacked.
    #[error("Failed to extract {}: {message}", archive.display())]
    #[diagnostic(code(chromeup::installer::extract))]
    Extract {
        /// The archive path.
        archive: Box<Path>,
        /// What went wrong.
        message: String,
    },

    /// Version resolution failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolver(#[from] chromeup_resolver::Error),

    /// Cache lookup or store failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] chromeup_cache::Error),

    /// Malformed version or unsupported platform.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] chromeup_core::Error),

    /// I/O error during download or extraction.
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(code(chromeup::installer::io))]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Path that caused the error.
        path: Box<Path>,
        /// Operation that failed.
        operation: &'static str,
    },
}

impl Error {
    /// Create a version-not-found error.
    #[must_use]
    pub fn version_not_found(version: impl Into<String>, platform: impl ToString) -> Self {
        Self::VersionNotFound {
            version: version.into(),
            platform: platform.to_string(),
        }
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extract(archive: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Extract {
            archive: archive.as_ref().into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(source: std::io::Error, path: impl AsRef<Path>, operation: &'static str) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation,
        }
    }
}

/// Result type for installer operations.
pub type Result<T> = std::result::Result<T, Error>;
