//! Platform identification.
//!
//! Download tables key on (OS, architecture) pairs, so both are modeled as
//! closed enums rather than strings. Cache directories additionally key on
//! the architecture name alone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform identifier combining OS and architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Get the platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self {
            os: Os::current(),
            arch: Arch::current(),
        }
    }

    /// Parse from a string like `"linux-x64"`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (os, arch) = s.split_once('-')?;
        Some(Self {
            os: Os::parse(os)?,
            arch: Arch::parse(arch)?,
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS.
    Darwin,
    /// Windows.
    Windows,
}

impl Os {
    /// Get the OS this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Self::Darwin,
            "windows" => Self::Windows,
            _ => Self::Linux,
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "darwin" | "macos" => Some(Self::Darwin),
            "windows" | "win32" => Some(Self::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Darwin => write!(f, "darwin"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// CPU architecture.
///
/// Rendered with the CI runner's names (`x64`, `arm64`, `x32`) because the
/// architecture string doubles as a cache directory component shared with
/// other runner tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit x86.
    Amd64,
    /// 32-bit x86.
    I686,
    /// 64-bit ARM.
    Arm64,
}

impl Arch {
    /// Get the architecture this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => Self::Arm64,
            "x86" => Self::I686,
            _ => Self::Amd64,
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Some(Self::Amd64),
            "x32" | "x86" | "i686" => Some(Self::I686),
            "arm64" | "aarch64" => Some(Self::Arm64),
            _ => None,
        }
    }

    /// The CI runner's name for this architecture.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "x64",
            Self::I686 => "x32",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse() {
        let p = Platform::parse("linux-x64").unwrap();
        assert_eq!(p.os, Os::Linux);
        assert_eq!(p.arch, Arch::Amd64);

        let p = Platform::parse("darwin-arm64").unwrap();
        assert_eq!(p.os, Os::Darwin);
        assert_eq!(p.arch, Arch::Arm64);

        let p = Platform::parse("windows-x32").unwrap();
        assert_eq!(p.os, Os::Windows);
        assert_eq!(p.arch, Arch::I686);

        assert!(Platform::parse("linux").is_none());
        assert!(Platform::parse("solaris-sparc").is_none());
        assert!(Platform::parse("").is_none());
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::new(Os::Linux, Arch::Amd64).to_string(), "linux-x64");
        assert_eq!(
            Platform::new(Os::Darwin, Arch::Arm64).to_string(),
            "darwin-arm64"
        );
        assert_eq!(
            Platform::new(Os::Windows, Arch::I686).to_string(),
            "windows-x32"
        );
    }

    #[test]
    fn test_platform_current() {
        let p = Platform::current();
        assert!(matches!(p.os, Os::Linux | Os::Darwin | Os::Windows));
    }

    #[test]
    fn test_os_parse_aliases() {
        assert_eq!(Os::parse("macos"), Some(Os::Darwin));
        assert_eq!(Os::parse("Darwin"), Some(Os::Darwin));
        assert_eq!(Os::parse("win32"), Some(Os::Windows));
        assert_eq!(Os::parse("LINUX"), Some(Os::Linux));
        assert_eq!(Os::parse("freebsd"), None);
    }

    #[test]
    fn test_arch_parse_aliases() {
        assert_eq!(Arch::parse("x64"), Some(Arch::Amd64));
        assert_eq!(Arch::parse("amd64"), Some(Arch::Amd64));
        assert_eq!(Arch::parse("X86_64"), Some(Arch::Amd64));
        assert_eq!(Arch::parse("aarch64"), Some(Arch::Arm64));
        assert_eq!(Arch::parse("i686"), Some(Arch::I686));
        assert_eq!(Arch::parse("mips"), None);
    }

    #[test]
    fn test_arch_runner_names() {
        assert_eq!(Arch::Amd64.as_str(), "x64");
        assert_eq!(Arch::I686.as_str(), "x32");
        assert_eq!(Arch::Arm64.as_str(), "arm64");
    }
}
