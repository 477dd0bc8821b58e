//! Timestamped backups taken before a file is rewritten

use crate::error::SwitchError;
use std::path::{Path, PathBuf};

/// `chrono` format of the backup suffix
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Backup path for `path` at the current local time
///
/// `appsettings.json` becomes `appsettings.json.backup.20240131_142501`.
#[must_use]
pub fn backup_path_for(path: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format(BACKUP_TIMESTAMP_FORMAT);
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".backup.{stamp}"));
    PathBuf::from(name)
}

/// Copy `path` to a timestamped sibling and return the copy's path
///
/// # Errors
/// `SwitchError::FileNotFound` if `path` is missing, `SwitchError::Io` if the
/// copy fails
pub async fn create_backup(path: impl AsRef<Path>) -> Result<PathBuf, SwitchError> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(SwitchError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let backup = backup_path_for(path);
    tokio::fs::copy(path, &backup)
        .await
        .map_err(|e| SwitchError::io_error(&backup, e))?;
    tracing::info!("Backup created: {}", backup.display());
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn backup_name_has_timestamp_suffix() {
        let backup = backup_path_for(Path::new("/tmp/appsettings.json"));
        let name = backup.file_name().unwrap().to_str().unwrap();
        let stamp = name.strip_prefix("appsettings.json.backup.").unwrap();
        assert_eq!(stamp.len(), "YYYYMMDD_HHMMSS".len());
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).is_ok());
    }

    #[tokio::test]
    async fn backup_copies_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("web.config");
        std::fs::write(&path, "<configuration />\n").unwrap();

        let backup = create_backup(&path).await.unwrap();
        assert_eq!(backup.parent(), Some(dir.path()));
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "<configuration />\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<configuration />\n");
    }

    #[tokio::test]
    async fn backup_of_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = create_backup(dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err, SwitchError::FileNotFound { .. }));
    }
}
