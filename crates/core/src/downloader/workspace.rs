//! Scratch directories and artifact relocation.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use uuid::Uuid;

use super::error::DownloadError;

/// File stem the extraction tool is told to use for the artifact.
pub(crate) const ARTIFACT_STEM: &str = "result";

/// Creates a private scratch directory under `parent`.
///
/// The directory and everything in it is removed when the returned guard is
/// dropped, whichever way the download ends.
pub(crate) async fn create_scratch_dir(parent: &Path) -> Result<TempDir, DownloadError> {
    let workspace_err = |source| DownloadError::Workspace {
        path: parent.to_path_buf(),
        source,
    };

    fs::create_dir_all(parent).await.map_err(workspace_err)?;

    tempfile::Builder::new()
        .prefix("download-")
        .tempdir_in(parent)
        .map_err(workspace_err)
}

/// Finds `result.<ext>` in `dir`, ignoring sidecars and partial files.
pub(crate) async fn find_artifact(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let path = entry.path();
        // `result.info.json` and `result.mp4.part` have a different stem.
        let is_artifact = path.file_stem().is_some_and(|stem| stem == ARTIFACT_STEM)
            && path.extension().is_some_and(|ext| ext != "json");

        if is_artifact {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Moves `source` into `dest_dir` under a unique name and returns the new path.
///
/// Uses a rename when possible and falls back to copy + delete across
/// filesystems.
pub(crate) async fn relocate(source: &Path, dest_dir: &Path) -> Result<PathBuf, DownloadError> {
    let id = Uuid::new_v4().simple();
    let file_name = match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("video-{}.{}", id, ext),
        None => format!("video-{}", id),
    };
    let destination = dest_dir.join(file_name);

    let relocate_err = |error| DownloadError::Relocate {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: error,
    };

    match fs::rename(source, &destination).await {
        Ok(()) => Ok(destination),
        Err(e) if is_cross_device(&e) => {
            if let Err(e) = fs::copy(source, &destination).await {
                let _ = fs::remove_file(&destination).await;
                return Err(relocate_err(e));
            }
            let _ = fs::remove_file(source).await;
            Ok(destination)
        }
        Err(e) => Err(relocate_err(e)),
    }
}

fn is_cross_device(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::CrossesDevices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cross_device() {
        use std::io::{Error, ErrorKind};

        assert!(is_cross_device(&Error::from(ErrorKind::CrossesDevices)));
        assert!(!is_cross_device(&Error::from(ErrorKind::NotFound)));
        assert!(!is_cross_device(&Error::from(ErrorKind::PermissionDenied)));
    }

    #[tokio::test]
    async fn test_scratch_dir_is_removed_on_drop() {
        let parent = TempDir::new().unwrap();

        let scratch = create_scratch_dir(parent.path()).await.unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("result.mp4"), b"data").unwrap();
        assert!(path.starts_with(parent.path()));

        drop(scratch);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_scratch_dirs_are_distinct() {
        let parent = TempDir::new().unwrap();

        let a = create_scratch_dir(parent.path()).await.unwrap();
        let b = create_scratch_dir(parent.path()).await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_scratch_parent_is_created() {
        let parent = TempDir::new().unwrap();
        let nested = parent.path().join("a").join("b");

        let scratch = create_scratch_dir(&nested).await.unwrap();
        assert!(scratch.path().starts_with(&nested));
    }

    #[tokio::test]
    async fn test_find_artifact_skips_sidecars() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("result.info.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("result.webm.part"), b"x").unwrap();
        std::fs::write(dir.path().join("result.f137.mp4"), b"x").unwrap();
        assert_eq!(find_artifact(dir.path()).await.unwrap(), None);

        std::fs::write(dir.path().join("result.webm"), b"video").unwrap();
        assert_eq!(
            find_artifact(dir.path()).await.unwrap(),
            Some(dir.path().join("result.webm"))
        );
    }

    #[tokio::test]
    async fn test_relocate_moves_file() {
        let scratch = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let source = scratch.path().join("result.mkv");
        std::fs::write(&source, b"video bytes").unwrap();

        let moved = relocate(&source, dest.path()).await.unwrap();

        assert!(!source.exists());
        assert!(moved.starts_with(dest.path()));
        assert_eq!(moved.extension().unwrap(), "mkv");
        assert_eq!(std::fs::read(&moved).unwrap(), b"video bytes");
    }

    #[tokio::test]
    async fn test_relocate_missing_source_fails() {
        let dest = TempDir::new().unwrap();
        let err = relocate(Path::new("/nonexistent/result.mp4"), dest.path())
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Relocate { .. }));
    }
}
