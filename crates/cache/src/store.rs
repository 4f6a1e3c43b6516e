//! The versioned tool cache.
//!
//! The generic runner tool cache only understands semver, so browser builds
//! get their own store that speaks the full version grammar (channels,
//! snapshot build numbers, `latest`, four-part prefixes). Entries live in a
//! fixed sub-directory of the runner's tool cache to avoid colliding with
//! any other tooling sharing the same root:
//!
//! ```text
//! $RUNNER_TOOL_CACHE/chromeup/<tool>/<version>/<arch>/          tool contents
//! $RUNNER_TOOL_CACHE/chromeup/<tool>/<version>/<arch>.complete  marker
//! ```
//!
//! The zero-byte `.complete` marker is the sole completeness signal: it is
//! written only after a copy has fully finished, so a directory without its
//! marker is an aborted or in-flight install and is ignored by lookups and
//! clobbered by the next store. There is no cross-process locking; two
//! processes storing the same key race benignly (both copy to the same
//! destination, the last marker write wins).

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chromeup_core::platform::Arch;
use chromeup_core::version::VersionSpec;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Environment variable naming the runner's base tool cache directory.
pub const TOOL_CACHE_ENV: &str = "RUNNER_TOOL_CACHE";

/// Sub-directory of the runner tool cache that this store owns.
const CACHE_SUBDIR: &str = "chromeup";

/// Versioned on-disk cache of installed tools.
///
/// The root is an explicit field so tests (and embedders) can point the
/// cache anywhere; [`ToolCache::from_env`] is the production constructor.
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    /// Create a cache rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a cache under `$RUNNER_TOOL_CACHE/chromeup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEnvironment`] when the variable is unset or
    /// empty; an unconfigured cache root is a configuration error, not a
    /// cache miss.
    pub fn from_env() -> Result<Self> {
        let base = std::env::var(TOOL_CACHE_ENV).unwrap_or_default();
        if base.is_empty() {
            return Err(Error::MissingEnvironment {
                var: TOOL_CACHE_ENV,
            });
        }
        Ok(Self::new(PathBuf::from(base).join(CACHE_SUBDIR)))
    }

    /// Get the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up the best cached entry for a tool satisfying a version spec.
    ///
    /// Scans `<root>/<tool>/` treating every sub-directory name as a
    /// candidate concrete version. A candidate qualifies when the spec
    /// accepts it, the spec does not order itself strictly above it, and
    /// `<root>/<tool>/<candidate>/<arch>` exists with its `.complete`
    /// marker. Among qualifying candidates the maximum under the version
    /// ordering wins, tracked explicitly because directory listing order is
    /// not sorted.
    ///
    /// A missing tool directory is an ordinary miss (`Ok(None)`), and so is
    /// a directory name that is not a version at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] for an empty tool name or spec,
    /// [`chromeup_core::Error::InvalidVersion`] for a malformed spec, and
    /// I/O errors from listing the tool directory.
    pub fn find(&self, tool: &str, version_spec: &str, arch: Arch) -> Result<Option<PathBuf>> {
        if tool.is_empty() {
            return Err(Error::missing_argument("tool"));
        }
        if version_spec.is_empty() {
            return Err(Error::missing_argument("version"));
        }
        let spec = VersionSpec::parse(version_spec)?;

        let tool_dir = self.root.join(tool);
        if !tool_dir.is_dir() {
            debug!(path = %tool_dir.display(), "cache directory not found");
            return Ok(None);
        }

        let mut best: Option<(VersionSpec, PathBuf)> = None;
        let entries = std::fs::read_dir(&tool_dir).map_err(|e| Error::io(e, &tool_dir, "read"))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(e, &tool_dir, "read"))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Ok(candidate) = VersionSpec::parse(name) else {
                trace!(%name, "ignoring non-version entry in cache");
                continue;
            };
            if !spec.satisfies(&candidate) {
                continue;
            }
            if spec.partial_cmp(&candidate) == Some(Ordering::Less) {
                continue;
            }

            let dir = tool_dir.join(name).join(arch.as_str());
            if !dir.is_dir() || !marker_path(&dir).exists() {
                trace!(%name, %arch, "skipping incomplete cache entry");
                continue;
            }

            let is_better = best
                .as_ref()
                .is_none_or(|(b, _)| candidate.partial_cmp(b) == Some(Ordering::Greater));
            if is_better {
                best = Some((candidate, dir));
            }
        }

        match best {
            Some((_, path)) => {
                debug!(%tool, %version_spec, %arch, path = %path.display(), "found tool in cache");
                Ok(Some(path))
            }
            None => {
                debug!(%tool, %version_spec, %arch, "tool not found in cache");
                Ok(None)
            }
        }
    }

    /// Copy a directory's contents into the cache and mark them complete.
    ///
    /// Any pre-existing directory and marker for the same key are removed
    /// first, so a fresh store never mixes with stale partial content. The
    /// marker is written only after the copy has fully finished; if the
    /// process dies mid-copy the entry stays invisible and the next store
    /// starts clean. Returns the destination directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotADirectory`] when `source_dir` is not an existing
    /// directory, and I/O errors from the copy.
    pub fn store(
        &self,
        source_dir: impl AsRef<Path>,
        tool: &str,
        version: &str,
        arch: Arch,
    ) -> Result<PathBuf> {
        let source_dir = source_dir.as_ref();
        debug!(%tool, %version, %arch, source = %source_dir.display(), "caching tool");
        if !source_dir.is_dir() {
            return Err(Error::not_a_directory(source_dir));
        }

        let dest = self.root.join(tool).join(version).join(arch.as_str());
        let marker = marker_path(&dest);

        if dest.exists() {
            std::fs::remove_dir_all(&dest).map_err(|e| Error::io(e, &dest, "remove"))?;
        }
        if marker.is_dir() {
            std::fs::remove_dir_all(&marker).map_err(|e| Error::io(e, &marker, "remove"))?;
        } else if marker.exists() {
            std::fs::remove_file(&marker).map_err(|e| Error::io(e, &marker, "remove"))?;
        }

        std::fs::create_dir_all(&dest).map_err(|e| Error::io(e, &dest, "create"))?;
        copy_dir_contents(source_dir, &dest)?;

        std::fs::write(&marker, b"").map_err(|e| Error::io(e, &marker, "write"))?;
        debug!(path = %dest.display(), "cached tool");

        Ok(dest)
    }
}

/// Sibling completion marker for an arch directory: `<dir>.complete`.
fn marker_path(dir: &Path) -> PathBuf {
    let mut path = dir.as_os_str().to_os_string();
    path.push(".complete");
    PathBuf::from(path)
}

/// Recursively copy every entry of `src` into the existing directory `dst`.
fn copy_dir_contents(src: &Path, dst: &Path) -> Result<()> {
    let entries = std::fs::read_dir(src).map_err(|e| Error::io(e, src, "read"))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(e, src, "read"))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io(e, &src_path, "stat"))?;
        if file_type.is_dir() {
            std::fs::create_dir_all(&dst_path).map_err(|e| Error::io(e, &dst_path, "create"))?;
            copy_dir_contents(&src_path, &dst_path)?;
        } else {
            // fs::copy preserves permission bits, which keeps extracted
            // executables executable.
            std::fs::copy(&src_path, &dst_path).map_err(|e| Error::io(e, &dst_path, "copy"))?;
        }
    }
    Ok(())
}
