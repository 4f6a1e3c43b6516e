//! Versioned on-disk tool cache for chromeup.
//!
//! See [`ToolCache`] for the cache layout and the completion-marker
//! protocol. Lookup semantics (the version grammar and the best-match
//! ordering) come from [`chromeup_core::version`].

mod error;
mod store;

pub use error::{Error, Result};
pub use store::{TOOL_CACHE_ENV, ToolCache};
