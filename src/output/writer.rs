use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::Envelope;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to create directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serializes `envelope` and replaces the file at `path` with it.
///
/// Missing parent directories are created. The JSON goes to a temp file next
/// to `path`, is synced, then renamed over the target, so readers see either
/// the old snapshot or the new one, never a partial file.
pub fn write_envelope<T: Serialize>(path: &Path, envelope: &Envelope<T>) -> Result<(), WriteError> {
    let json = envelope.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    atomic_write(path, json.as_bytes())?;
    tracing::info!(
        path = %path.display(),
        articles = envelope.articles.len(),
        "Wrote feed snapshot"
    );
    Ok(())
}

/// Write-to-temp-then-rename. The destination is never left half written.
fn atomic_write(dst: &Path, content: &[u8]) -> Result<(), WriteError> {
    // SEC-009: Unpredictable temp name so nothing can be planted there first
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails if the path exists (symlink race)
        .open(&temp_path)
        .map_err(|source| WriteError::Io {
            path: temp_path.clone(),
            source,
        })?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all());
    drop(temp_file);
    if let Err(source) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(WriteError::Io {
            path: temp_path,
            source,
        });
    }

    // On Windows, rename fails if destination exists, so remove it first
    #[cfg(windows)]
    if dst.exists() {
        if let Err(source) = std::fs::remove_file(dst) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(WriteError::Io {
                path: dst.to_path_buf(),
                source,
            });
        }
    }

    if let Err(source) = std::fs::rename(&temp_path, dst) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(WriteError::Io {
            path: dst.to_path_buf(),
            source,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("feedsnap_writer_test_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn envelope(items: &[&str]) -> Envelope<String> {
        Envelope {
            last_updated: "2024-01-01T00:00:00.000000+00:00".to_string(),
            articles: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let dir = scratch_dir("nested");
        let path = dir.join("assets").join("data").join("feed.json");

        write_envelope(&path, &envelope(&["a"])).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"last_updated\": \"2024-01-01T00:00:00.000000+00:00\""));
        assert!(written.contains("\"a\""));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = scratch_dir("overwrite");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feed.json");
        std::fs::write(&path, "old content that is longer than the new snapshot......").unwrap();

        write_envelope(&path, &envelope(&[])).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with('{'));
        assert!(written.ends_with('}'));
        assert!(!written.contains("old content"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = scratch_dir("temp_cleanup");
        let path = dir.join("feed.json");

        write_envelope(&path, &envelope(&["x"])).unwrap();

        let entries: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["feed.json".to_string()]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_parent_is_a_file_fails() {
        let dir = scratch_dir("parent_file");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = write_envelope(&blocker.join("feed.json"), &envelope(&[])).unwrap_err();
        assert!(matches!(err, WriteError::CreateDir { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}
