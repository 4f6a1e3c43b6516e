//! Archive extraction.
//!
//! Every archive this system consumes - Chrome for Testing builds, Chromium
//! snapshots, chromedriver bundles - is a zip.

use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

use crate::{Error, Result};

/// Unpack a zip archive into a fresh temporary directory.
///
/// Entry names are resolved with `enclosed_name`, so entries that would
/// escape the extraction root are skipped. Unix permission bits recorded in
/// the archive are preserved; Chrome ships its executables with the
/// executable bit set.
///
/// The returned [`TempDir`] removes the tree on drop, so callers keep it
/// alive until the contents have been copied into the cache.
///
/// # Errors
///
/// Fails when the archive is unreadable or not a valid zip.
pub fn extract_zip(archive: &Path) -> Result<TempDir> {
    let file = std::fs::File::open(archive).map_err(|e| Error::io(e, archive, "open"))?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| Error::extract(archive, format!("failed to open zip: {e}")))?;

    let dir = TempDir::new().map_err(|e| Error::io(e, std::env::temp_dir(), "create"))?;
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::extract(archive, format!("failed to read zip entry: {e}")))?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let out_path = dir.path().join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| Error::io(e, &out_path, "create"))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create"))?;
        }
        let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::extract(archive, format!("failed to read zip entry: {e}")))?;
        std::fs::write(&out_path, &content).map_err(|e| Error::io(e, &out_path, "write"))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))
                .map_err(|e| Error::io(e, &out_path, "chmod"))?;
        }
    }

    debug!(archive = %archive.display(), dest = %dir.path().display(), "extracted archive");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8])]) -> tempfile::TempPath {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default().unix_permissions(0o755))
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
        file.into_temp_path()
    }

    #[test]
    fn test_extract_zip() {
        let archive = build_zip(&[
            ("chrome-linux/chrome", b"binary"),
            ("chrome-linux/locales/en-US.pak", b"pak"),
        ]);

        let dir = extract_zip(&archive).unwrap();
        let root = dir.path().join("chrome-linux");
        assert_eq!(std::fs::read(root.join("chrome")).unwrap(), b"binary");
        assert_eq!(
            std::fs::read(root.join("locales").join("en-US.pak")).unwrap(),
            b"pak"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(root.join("chrome")).unwrap().permissions().mode();
            assert_eq!(mode & 0o755, 0o755);
        }
    }

    #[test]
    fn test_extract_cleans_up_on_drop() {
        let archive = build_zip(&[("file", b"content")]);
        let dir = extract_zip(&archive).unwrap();
        let root = dir.path().to_path_buf();
        drop(dir);
        assert!(!root.exists());
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a zip").unwrap();
        assert!(matches!(
            extract_zip(file.path()),
            Err(Error::Extract { .. })
        ));
    }
}
