//! Error types for the cache crate.

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for cache operations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A required parameter was empty.
    #[error("{name} parameter is required")]
    #[diagnostic(code(chromeup::cache::missing_argument))]
    MissingArgument {
        /// Name of the missing parameter.
        name: &'static str,
    },

    /// The cache root environment variable is not set.
    #[error("Expected {var} to be defined")]
    #[diagnostic(
        code(chromeup::cache::missing_environment),
        help("set the variable to the runner's tool cache directory")
    )]
    MissingEnvironment {
        /// Name of the missing environment variable.
        var: &'static str,
    },

    /// Store was given a source path that is not a directory.
    #[error("Not a directory: {}", path.display())]
    #[diagnostic(code(chromeup::cache::not_a_directory))]
    NotADirectory {
        /// The offending source path.
        path: Box<Path>,
    },

    /// Malformed version spec.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] chromeup_core::Error),

    /// I/O error during cache operations.
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(
        code(chromeup::cache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Path that caused the error.
        path: Box<Path>,
        /// Operation that failed (e.g., "read", "copy", "create").
        operation: &'static str,
    },
}

impl Error {
    /// Create a missing argument error.
    #[must_use]
    pub fn missing_argument(name: &'static str) -> Self {
        Self::MissingArgument { name }
    }

    /// Create a not-a-directory error.
    #[must_use]
    pub fn not_a_directory(path: impl AsRef<Path>) -> Self {
        Self::NotADirectory {
            path: path.as_ref().into(),
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

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
