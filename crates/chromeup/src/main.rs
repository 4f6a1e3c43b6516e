//! chromeup CLI.
//!
//! Resolves, downloads, and caches a Chrome/Chromium build (and optionally
//! the matching chromedriver) for the current CI runner, then prints the
//! installed executable paths. All logic lives in the library crates; this
//! binary is argument parsing and wiring.

// The whole point of this binary is printing paths to stdout.
#![allow(clippy::print_stdout)]

use clap::Parser;
use miette::miette;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chromeup_cache::ToolCache;
use chromeup_core::platform::{Arch, Platform};
use chromeup_core::version::VersionSpec;
use chromeup_installer::{InstallerOptions, install_browser, install_driver, installer_for};

#[derive(Debug, Parser)]
#[command(name = "chromeup", version, about = "Set up Chrome/Chromium and chromedriver for CI")]
struct Cli {
    /// Version to install: "latest", a channel name, a snapshot build
    /// number, or a four-part version (trailing components may be omitted
    /// or "x").
    #[arg(long, default_value = "latest", env = "CHROMEUP_BROWSER_VERSION")]
    browser_version: String,

    /// Target architecture (x64, x32, arm64). Defaults to the current
    /// machine.
    #[arg(long)]
    arch: Option<String>,

    /// Also install the matching chromedriver.
    #[arg(long)]
    install_driver: bool,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut platform = Platform::current();
    if let Some(arch) = &cli.arch {
        platform.arch =
            Arch::parse(arch).ok_or_else(|| miette!("unsupported architecture: {arch}"))?;
    }

    let spec = VersionSpec::parse(&cli.browser_version)?;
    info!(version = %spec, %platform, "setting up browser");

    let cache = ToolCache::from_env()?;
    let options = InstallerOptions {
        // Browser-only runs are not limited to builds that also ship a
        // driver archive.
        resolve_browser_version_only: !cli.install_driver,
    };
    let installer = installer_for(platform, cache, &spec, &options)?;

    let browser = install_browser(installer.as_ref(), &cli.browser_version).await?;
    println!("chrome {}", browser.bin_path().display());

    if cli.install_driver {
        let driver = install_driver(installer.as_ref(), &cli.browser_version).await?;
        println!("chromedriver {}", driver.bin_path().display());
    }

    Ok(())
}
