use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{calculate_bmi, Gender, Measurement, Member};
use crate::error::{GrowthError, Result};

pub const BACKUP_SCHEMA_VERSION: &str = "1.0";

/// Timestamp form used for every measurement inside a backup file
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Portable snapshot of every member of one account.
///
/// Field names written are `ownerId`, `timestamp`, `schemaVersion` and
/// `members`. Files produced by the older web client (`userId`, `version`,
/// `dob`, `initialData`, `growthData`, `date`) are read as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(alias = "userId")]
    pub owner_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(alias = "version", default = "default_schema_version")]
    pub schema_version: String,
    pub members: Vec<BackupMember>,
}

fn default_schema_version() -> String {
    BACKUP_SCHEMA_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMember {
    /// Exported for reference only; restore assigns fresh ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(alias = "dob")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(alias = "initialData")]
    pub baseline_measurement: BackupMeasurement,
    #[serde(default, alias = "growthData")]
    pub incremental_measurements: Vec<BackupMeasurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupMeasurement {
    pub height: f64,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(alias = "date")]
    pub timestamp: String,
}

pub fn format_backup_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(BACKUP_TIMESTAMP_FORMAT).to_string()
}

/// Parses the backup form, falling back to RFC 3339
pub fn parse_backup_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, BACKUP_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
}

impl BackupDocument {
    pub fn new(owner_id: impl Into<String>, created_at: DateTime<Utc>, members: Vec<BackupMember>) -> Self {
        Self {
            owner_id: owner_id.into(),
            timestamp: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            schema_version: BACKUP_SCHEMA_VERSION.to_string(),
            members,
        }
    }

    pub fn validate_owner(&self, expected_owner_id: &str) -> Result<()> {
        if self.owner_id != expected_owner_id {
            return Err(GrowthError::OwnerMismatch {
                expected: expected_owner_id.to_string(),
                found: Some(self.owner_id.clone()),
            });
        }
        Ok(())
    }
}

impl From<&Measurement> for BackupMeasurement {
    fn from(m: &Measurement) -> Self {
        Self {
            height: m.height,
            weight: m.weight,
            bmi: Some(m.bmi),
            timestamp: format_backup_timestamp(&m.timestamp),
        }
    }
}

impl BackupMeasurement {
    /// Converts back to a live measurement; a missing BMI is derived
    pub fn to_measurement(&self) -> Result<Measurement> {
        let timestamp = parse_backup_timestamp(&self.timestamp).ok_or_else(|| {
            GrowthError::MalformedDocument(format!("unreadable timestamp '{}'", self.timestamp))
        })?;

        Ok(Measurement {
            height: self.height,
            weight: self.weight,
            bmi: self
                .bmi
                .unwrap_or_else(|| calculate_bmi(self.height, self.weight)),
            timestamp,
        })
    }
}

impl From<&Member> for BackupMember {
    fn from(member: &Member) -> Self {
        Self {
            id: Some(member.id.clone()),
            name: member.name.clone(),
            date_of_birth: member.date_of_birth,
            gender: member.gender,
            baseline_measurement: BackupMeasurement::from(&member.baseline_measurement),
            incremental_measurements: member
                .incremental_measurements
                .iter()
                .map(BackupMeasurement::from)
                .collect(),
            created_at: member.created_at.as_ref().map(format_backup_timestamp),
        }
    }
}

impl BackupMember {
    /// Baseline and incremental measurements as live values
    pub fn measurements(&self) -> Result<(Measurement, Vec<Measurement>)> {
        let baseline = self.baseline_measurement.to_measurement()?;
        let incremental = self
            .incremental_measurements
            .iter()
            .map(BackupMeasurement::to_measurement)
            .collect::<Result<Vec<_>>>()?;
        Ok((baseline, incremental))
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_backup_timestamp)
    }
}
