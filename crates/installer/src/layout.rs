//! Archive layouts: the root directory inside each archive flavor and the
//! executable path relative to it.

use chromeup_core::platform::{Arch, Os, Platform};

/// Root directory inside a Chromium snapshot browser archive.
pub(crate) fn snapshot_browser_root(os: Os) -> &'static str {
    match os {
        Os::Darwin => "chrome-mac",
        Os::Linux => "chrome-linux",
        Os::Windows => "chrome-win",
    }
}

/// Browser executable inside a snapshot install, relative to the root.
pub(crate) fn snapshot_browser_bin(os: Os) -> &'static str {
    match os {
        Os::Darwin => "Chromium.app/Contents/MacOS/Chromium",
        Os::Linux => "chrome",
        Os::Windows => "chrome.exe",
    }
}

/// Root directory inside a Chromium snapshot driver archive.
pub(crate) fn snapshot_driver_root(platform: Platform) -> &'static str {
    match platform.os {
        Os::Darwin => "chromedriver_mac64",
        Os::Linux => "chromedriver_linux64",
        Os::Windows => {
            if platform.arch == Arch::Arm64 {
                "chromedriver_win64"
            } else {
                "chromedriver_win32"
            }
        }
    }
}

/// Root directory inside a Chrome for Testing browser archive.
pub(crate) fn testing_browser_root(platform_string: &str) -> String {
    format!("chrome-{platform_string}")
}

/// Browser executable inside a Chrome for Testing install, relative to the
/// root.
pub(crate) fn testing_browser_bin(os: Os) -> &'static str {
    match os {
        Os::Darwin => "Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
        Os::Linux => "chrome",
        Os::Windows => "chrome.exe",
    }
}

/// Root directory inside a Chrome for Testing driver archive.
pub(crate) fn testing_driver_root(platform_string: &str) -> String {
    format!("chromedriver-{platform_string}")
}

/// Driver executable, relative to its install root. Identical for both
/// archive flavors.
pub(crate) fn driver_bin(os: Os) -> &'static str {
    match os {
        Os::Windows => "chromedriver.exe",
        _ => "chromedriver",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_layout() {
        assert_eq!(snapshot_browser_root(Os::Linux), "chrome-linux");
        assert_eq!(
            snapshot_browser_bin(Os::Darwin),
            "Chromium.app/Contents/MacOS/Chromium"
        );
        assert_eq!(
            snapshot_driver_root(Platform::new(Os::Windows, Arch::Amd64)),
            "chromedriver_win32"
        );
        assert_eq!(
            snapshot_driver_root(Platform::new(Os::Windows, Arch::Arm64)),
            "chromedriver_win64"
        );
    }

    #[test]
    fn test_testing_layout() {
        assert_eq!(testing_browser_root("linux64"), "chrome-linux64");
        assert_eq!(testing_driver_root("mac-arm64"), "chromedriver-mac-arm64");
        assert_eq!(testing_browser_bin(Os::Linux), "chrome");
        assert_eq!(driver_bin(Os::Windows), "chromedriver.exe");
        assert_eq!(driver_bin(Os::Linux), "chromedriver");
    }
}
