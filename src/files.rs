// Backup and CSV files on local disk

use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::GrowthConfig;
use crate::error::Result;
use crate::models::BackupDocument;
use crate::services::encode_backup;

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("growth-backup-{}.json", date.format("%Y-%m-%d"))
}

pub fn csv_file_name(date: NaiveDate) -> String {
    format!("growth-data-{}.csv", date.format("%Y-%m-%d"))
}

/// Reads and writes export files in one directory
#[derive(Debug, Clone)]
pub struct BackupFiles {
    dir: PathBuf,
}

impl BackupFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Files in `GROWTH_BACKUP_DIR`
    pub fn from_config(config: &GrowthConfig) -> Self {
        Self::new(config.backup_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Written as `growth-backup-<date>.json`, dated by the backup's own
    /// timestamp when it parses and today otherwise
    pub async fn write_backup(&self, doc: &BackupDocument) -> Result<PathBuf> {
        let date = DateTime::parse_from_rfc3339(&doc.timestamp)
            .map(|ts| ts.date_naive())
            .unwrap_or_else(|_| Utc::now().date_naive());

        let path = self.dir.join(backup_file_name(date));
        let json = encode_backup(doc)?;
        tokio::fs::write(&path, json).await?;

        info!("Wrote backup of {} members to {}", doc.members.len(), path.display());
        Ok(path)
    }

    pub async fn write_csv(&self, date: NaiveDate, csv: &str) -> Result<PathBuf> {
        let path = self.dir.join(csv_file_name(date));
        tokio::fs::write(&path, csv).await?;

        info!("Wrote CSV export to {}", path.display());
        Ok(path)
    }

    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrowthError;
    use chrono::TimeZone;

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(backup_file_name(date), "growth-backup-2024-03-09.json");
        assert_eq!(csv_file_name(date), "growth-data-2024-03-09.csv");
    }

    #[tokio::test]
    async fn test_backup_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let files = BackupFiles::new(dir.path());
        let created = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let doc = BackupDocument::new("owner", created, vec![]);

        let path = files.write_backup(&doc).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "growth-backup-2024-03-09.json");

        let text = String::from_utf8(files.read(&path).await.unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"ownerId\": \"owner\""));
    }

    #[tokio::test]
    async fn test_writes_into_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = GrowthConfig {
            backup_dir: dir.path().to_path_buf(),
            ..GrowthConfig::default()
        };
        let files = BackupFiles::from_config(&config);
        assert_eq!(files.dir(), dir.path());

        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let path = files.write_csv(date, "header\n").await.unwrap();
        assert_eq!(path, dir.path().join("growth-data-2024-03-09.csv"));
        assert_eq!(files.read(&path).await.unwrap(), b"header\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = BackupFiles::new(dir.path());

        let err = files.read(dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, GrowthError::Io(_)));
    }
}
