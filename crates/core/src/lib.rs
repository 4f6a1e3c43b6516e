//! Core types for chromeup: version specs and platform identification.
//!
//! Everything else in the workspace hangs off the two modules here:
//!
//! - [`version`] - the [`VersionSpec`](version::VersionSpec) tagged union that
//!   unifies release channels, four-part Chrome versions, Chromium snapshot
//!   build numbers, and the `latest` alias under one parse/satisfy/compare
//!   relation.
//! - [`platform`] - [`Platform`](platform::Platform), [`Os`](platform::Os),
//!   and [`Arch`](platform::Arch).

pub mod platform;
pub mod version;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for chromeup-core operations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Malformed version spec string. Always carries the offending input
    /// verbatim so CI logs show exactly what was asked for.
    #[error("Invalid version: {input}")]
    #[diagnostic(
        code(chromeup::core::invalid_version),
        help("expected \"latest\", a channel name, a snapshot build number, or a dotted version like \"119.0.6045.123\" (trailing components may be \"x\")")
    )]
    InvalidVersion {
        /// The version string that failed to parse.
        input: String,
    },

    /// No download mapping exists for this OS/architecture combination.
    #[error("Unsupported platform: {os} {arch}")]
    #[diagnostic(code(chromeup::core::unsupported_platform))]
    UnsupportedPlatform {
        /// Operating system name.
        os: String,
        /// Architecture name.
        arch: String,
    },
}

impl Error {
    /// Create an invalid version error.
    #[must_use]
    pub fn invalid_version(input: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
        }
    }

    /// Create an unsupported platform error.
    #[must_use]
    pub fn unsupported_platform(os: impl ToString, arch: impl ToString) -> Self {
        Self::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }
}

/// Result type alias for chromeup-core operations.
pub type Result<T> = std::result::Result<T, Error>;
