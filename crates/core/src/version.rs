//! Version specs for browser builds.
//!
//! Chrome and Chromium are addressed by five different schemes in the wild,
//! and CI users type all of them:
//!
//! - `latest` - the newest available Chromium snapshot
//! - `stable` | `beta` | `dev` | `canary` - a release channel
//! - `123456` - a Chromium snapshot build number
//! - `119.0.6045.123` - a full four-part Chrome version
//! - `119`, `119.0`, `119.0.6045.x` - a four-part prefix (trailing components
//!   omitted or wildcarded)
//!
//! [`VersionSpec`] folds all of these into one tagged union with a single
//! parse, satisfaction, and comparison relation. Comparison is partial:
//! specs of different variants (and four-part specs that differ only past a
//! wildcard) are incomparable, which [`PartialOrd`] expresses as `None`
//! rather than an arbitrary order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Undotted numeric versions above this value are Chromium snapshot build
/// numbers, not Chrome major versions. Snapshot builds count monotonically
/// past a million while Chrome majors sit around 50-200, so the two ranges
/// do not overlap in practice. Cache directory names are classified with the
/// same rule, so it must never change.
const SNAPSHOT_MIN: u32 = 10000;

/// A Chrome release channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The stable channel.
    Stable,
    /// The beta channel.
    Beta,
    /// The dev channel.
    Dev,
    /// The canary channel.
    Canary,
}

impl Channel {
    /// Parse a channel name. Case-sensitive: channel names are exact
    /// keywords, and `"Stable"` is a (rejected) version string, not a
    /// channel.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stable" => Some(Self::Stable),
            "beta" => Some(Self::Beta),
            "dev" => Some(Self::Dev),
            "canary" => Some(Self::Canary),
            _ => None,
        }
    }

    /// The lowercase channel name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Beta => "beta",
            Self::Dev => "dev",
            Self::Canary => "canary",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed version spec.
///
/// A spec is either a concrete installable identity (`latest`, a channel, a
/// snapshot build, a full four-part version) or a constraint (a four-part
/// version with trailing wildcards). [`VersionSpec::satisfies`] is the
/// "spec matches instance" predicate; [`PartialOrd`] is the best-match
/// ordering used by the cache scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// The newest available build, resolved externally.
    Latest,
    /// A named release track.
    Channel(Channel),
    /// A Chromium continuous-build number.
    Snapshot(u32),
    /// A dotted version with optional trailing wildcards.
    FourPart {
        /// Major version, always concrete.
        major: u32,
        /// Minor version, `None` when wildcarded.
        minor: Option<u32>,
        /// Build number, `None` when wildcarded.
        build: Option<u32>,
        /// Patch level, `None` when wildcarded.
        patch: Option<u32>,
    },
}

impl VersionSpec {
    /// Parse a user-supplied version string.
    ///
    /// Classification order, first match wins: the literal `latest`, a
    /// channel name, an undotted integer above the snapshot threshold, a
    /// dotted four-part version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] for the empty string, a lone
    /// wildcard, more than four components, a non-numeric component, or a
    /// wildcard followed by a concrete component.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::invalid_version(input));
        }
        if input == "latest" {
            return Ok(Self::Latest);
        }
        if let Some(channel) = Channel::parse(input) {
            return Ok(Self::Channel(channel));
        }
        if !input.contains('.')
            && let Ok(build) = input.parse::<u32>()
            && build > SNAPSHOT_MIN
        {
            return Ok(Self::Snapshot(build));
        }
        Self::parse_four_part(input)
    }

    fn parse_four_part(input: &str) -> Result<Self> {
        let invalid = || Error::invalid_version(input);

        let mut digits: Vec<Option<u32>> = Vec::with_capacity(4);
        for part in input.split('.') {
            if part == "x" {
                digits.push(None);
            } else {
                digits.push(Some(part.parse().map_err(|_| invalid())?));
            }
        }
        if digits.len() > 4 {
            return Err(invalid());
        }
        // A wildcard must not precede a concrete component ("119.x.6045").
        for pair in digits.windows(2) {
            if pair[0].is_none() && pair[1].is_some() {
                return Err(invalid());
            }
        }
        let Some(major) = digits.first().copied().flatten() else {
            return Err(invalid());
        };

        Ok(Self::FourPart {
            major,
            minor: digits.get(1).copied().flatten(),
            build: digits.get(2).copied().flatten(),
            patch: digits.get(3).copied().flatten(),
        })
    }

    /// Whether this spec names exactly one installable version. Four-part
    /// specs are complete when all four components are concrete; every
    /// other variant always is.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self {
            Self::FourPart {
                minor,
                build,
                patch,
                ..
            } => minor.is_some() && build.is_some() && patch.is_some(),
            _ => true,
        }
    }

    /// Whether `candidate` is a concrete version accepted by this spec.
    ///
    /// Not symmetric: the candidate must be fully concrete (a partial
    /// four-part version is a constraint, not an instance, and never
    /// satisfies anything). Specs of different variants never satisfy each
    /// other. A wildcard component in `self` matches anything.
    #[must_use]
    pub fn satisfies(&self, candidate: &Self) -> bool {
        if !candidate.is_complete() {
            return false;
        }
        match (self, candidate) {
            (Self::Latest, Self::Latest) => true,
            (Self::Channel(a), Self::Channel(b)) => a == b,
            (Self::Snapshot(a), Self::Snapshot(b)) => a == b,
            (
                Self::FourPart {
                    major,
                    minor,
                    build,
                    patch,
                },
                Self::FourPart {
                    major: c_major,
                    minor: c_minor,
                    build: c_build,
                    patch: c_patch,
                },
            ) => {
                major == c_major
                    && minor.is_none_or(|v| Some(v) == *c_minor)
                    && build.is_none_or(|v| Some(v) == *c_build)
                    && patch.is_none_or(|v| Some(v) == *c_patch)
            }
            _ => false,
        }
    }

    /// [`satisfies`](Self::satisfies) against a raw version string, as found
    /// in cache directory names and manifest entries. Unparseable input is
    /// simply not a satisfying version.
    #[must_use]
    pub fn satisfies_str(&self, candidate: &str) -> bool {
        Self::parse(candidate).is_ok_and(|v| self.satisfies(&v))
    }

    /// The four components of a four-part spec, `None` for other variants.
    fn four_part_components(&self) -> Option<[Option<u32>; 4]> {
        match *self {
            Self::FourPart {
                major,
                minor,
                build,
                patch,
            } => Some([Some(major), minor, build, patch]),
            _ => None,
        }
    }
}

impl PartialOrd for VersionSpec {
    /// Component-wise, left-to-right ordering within a variant.
    ///
    /// `None` (incomparable) for cross-variant pairs, for distinct channels,
    /// and for four-part pairs whose first differing position involves a
    /// wildcard - the cache scan uses incomparability to skip non-competing
    /// entries instead of inventing an order.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Latest, Self::Latest) => Some(Ordering::Equal),
            (Self::Channel(a), Self::Channel(b)) => (a == b).then_some(Ordering::Equal),
            (Self::Snapshot(a), Self::Snapshot(b)) => Some(a.cmp(b)),
            (Self::FourPart { .. }, Self::FourPart { .. }) => {
                let lhs = self.four_part_components()?;
                let rhs = other.four_part_components()?;
                for (a, b) in lhs.into_iter().zip(rhs) {
                    match (a, b) {
                        (Some(x), Some(y)) if x != y => return Some(x.cmp(&y)),
                        (Some(_), Some(_)) | (None, None) => {}
                        _ => return None,
                    }
                }
                Some(Ordering::Equal)
            }
            _ => None,
        }
    }
}

impl fmt::Display for VersionSpec {
    /// Canonical minimal form: trailing wildcards are dropped, matching the
    /// user input forms (`119`, `119.0.6045`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Channel(channel) => write!(f, "{channel}"),
            Self::Snapshot(build) => write!(f, "{build}"),
            Self::FourPart {
                major,
                minor,
                build,
                patch,
            } => {
                write!(f, "{major}")?;
                for component in [minor, build, patch].into_iter().flatten() {
                    write!(f, ".{component}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for VersionSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
