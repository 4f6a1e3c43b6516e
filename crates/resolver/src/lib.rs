//! Remote version lookups for chromeup.
//!
//! Two sources cover the whole version grammar:
//!
//! - [`chrome_for_testing`] - the Chrome for Testing manifests, serving
//!   four-part specs and release channels.
//! - [`snapshot`] - the Chromium snapshot bucket, serving build numbers and
//!   the `latest` alias.
//!
//! Resolvers hold their manifest cache as an instance field and fetch at
//! most once per instance. "This version does not exist for this platform"
//! is `Ok(None)`, never an error; callers decide whether that is fatal.

pub mod chrome_for_testing;
mod error;
pub mod snapshot;

pub use chrome_for_testing::{
    KnownGoodVersionResolver, LastKnownGoodVersionResolver, ResolvedVersion, platform_string,
};
pub use error::{Error, Result};
pub use snapshot::SnapshotBucket;
