//! Private, writable copy of the cookies file.
//!
//! yt-dlp rewrites the cookies file it is given, so a read-only mount (a
//! container secret, for example) makes every download fail. The configured
//! file is copied into a private temp directory at startup instead.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::error::DownloadError;

const STAGED_NAME: &str = "cookies.txt";

/// A staged cookies file. The copy is removed when this value is dropped.
#[derive(Debug)]
pub struct StagedCookies {
    _dir: TempDir,
    path: PathBuf,
}

impl StagedCookies {
    /// Location of the writable copy.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copies `source` into a fresh temp directory, readable by the owner only.
pub fn stage_cookies_file(source: &Path) -> Result<StagedCookies, DownloadError> {
    let cookies_err = |source_err| DownloadError::Cookies {
        path: source.to_path_buf(),
        source: source_err,
    };

    let metadata = std::fs::metadata(source).map_err(cookies_err)?;
    if metadata.is_dir() {
        return Err(cookies_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "cookies file path cannot be a directory",
        )));
    }

    let content = std::fs::read(source).map_err(cookies_err)?;

    let dir = tempfile::Builder::new()
        .prefix("cookies-")
        .tempdir()
        .map_err(cookies_err)?;
    let path = dir.path().join(STAGED_NAME);

    write_private(&path, &content).map_err(cookies_err)?;

    Ok(StagedCookies { _dir: dir, path })
}

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stage_copies_content() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("cookies.txt");
        std::fs::write(&source, "# Netscape HTTP Cookie File\n").unwrap();

        let staged = stage_cookies_file(&source).unwrap();
        assert_ne!(staged.path(), source.as_path());
        assert_eq!(
            std::fs::read_to_string(staged.path()).unwrap(),
            "# Netscape HTTP Cookie File\n"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(staged.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        let staged_path = staged.path().to_path_buf();
        drop(staged);
        assert!(!staged_path.exists());
    }

    #[test]
    fn test_missing_file() {
        let err = stage_cookies_file(Path::new("/nonexistent/cookies.txt")).unwrap_err();
        assert!(matches!(err, DownloadError::Cookies { .. }));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = stage_cookies_file(dir.path()).unwrap_err();
        assert!(matches!(err, DownloadError::Cookies { .. }));
    }
}
