//! Pid file guard and healthcheck.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("pid file already exists: {0} (another instance may be running)")]
    AlreadyExists(PathBuf),

    #[error("pid file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pid in {path}: {content:?}")]
    InvalidPid { path: PathBuf, content: String },

    #[error("process {0} is not running")]
    NotRunning(i32),
}

/// Removes the pid file when dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Writes the current process id to `path`.
    ///
    /// Fails if the file already exists.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, PidFileError> {
        let path = path.into();

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                ErrorKind::AlreadyExists => PidFileError::AlreadyExists(path.clone()),
                _ => PidFileError::Io {
                    path: path.clone(),
                    source,
                },
            })?;

        write!(file, "{}", std::process::id()).map_err(|source| PidFileError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(pid_file = %self.path.display(), error = %e, "Failed to remove pid file");
        }
    }
}

/// Reads the pid stored at `path`.
pub fn read_pid(path: &Path) -> Result<i32, PidFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| PidFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    content
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|pid| *pid > 0)
        .ok_or_else(|| PidFileError::InvalidPid {
            path: path.to_path_buf(),
            content: content.trim().to_string(),
        })
}

/// Checks that the process recorded in the pid file is alive.
pub fn healthcheck(path: &Path) -> Result<i32, PidFileError> {
    let pid = read_pid(path)?;

    if is_process_alive(pid) {
        Ok(pid)
    } else {
        Err(PidFileError::NotRunning(pid))
    }
}

#[cfg(unix)]
fn is_process_alive(pid: i32) -> bool {
    // Signal 0 only checks that the process exists.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_alive(_pid: i32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_writes_pid_and_removes_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot.pid");

        {
            let pid_file = PidFile::create(&path).unwrap();
            assert_eq!(pid_file.path(), path);
            assert_eq!(read_pid(&path).unwrap(), std::process::id() as i32);
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot.pid");
        std::fs::write(&path, "123").unwrap();

        let err = PidFile::create(&path).unwrap_err();

        assert!(matches!(err, PidFileError::AlreadyExists(_)));
        assert!(err.to_string().contains("another instance may be running"));
        // The existing file is left alone
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "123");
    }

    #[test]
    fn test_healthcheck_own_process() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot.pid");
        let _pid_file = PidFile::create(&path).unwrap();

        assert_eq!(healthcheck(&path).unwrap(), std::process::id() as i32);
    }

    #[test]
    fn test_healthcheck_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = healthcheck(&dir.path().join("missing.pid")).unwrap_err();
        assert!(matches!(err, PidFileError::Io { .. }));
    }

    #[test]
    fn test_healthcheck_garbage_pid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot.pid");

        std::fs::write(&path, "not-a-pid\n").unwrap();
        assert!(matches!(
            healthcheck(&path).unwrap_err(),
            PidFileError::InvalidPid { .. }
        ));

        std::fs::write(&path, "0").unwrap();
        assert!(matches!(
            healthcheck(&path).unwrap_err(),
            PidFileError::InvalidPid { .. }
        ));
    }
}
