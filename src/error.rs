use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::store::StoreError;

/// Phase of a restore in which a store call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    DeleteExisting,
    WriteRestored,
}

impl std::fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestorePhase::DeleteExisting => write!(f, "delete existing members"),
            RestorePhase::WriteRestored => write!(f, "write restored members"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GrowthError {
    #[error("Insufficient data: prediction needs {required} measurements, found {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Degenerate fit for {series}: every measurement is at age {age_months} months")]
    DegenerateFit {
        series: &'static str,
        age_months: u32,
    },

    #[error("Horizon of {horizon_months} months from age {last_age_months} months is out of range")]
    HorizonOutOfRange {
        horizon_months: u32,
        last_age_months: u32,
    },

    #[error("Malformed backup document: {0}")]
    MalformedDocument(String),

    #[error("Backup belongs to another account (expected {expected}, found {})", found.as_deref().unwrap_or("none"))]
    OwnerMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("Store operation failed while trying to {step}: {source}")]
    Store {
        step: String,
        #[source]
        source: StoreError,
    },

    #[error("Restore aborted during '{phase}' at item {index} ({deleted} deleted, {restored} restored): {source}")]
    RestoreAborted {
        phase: RestorePhase,
        index: usize,
        deleted: usize,
        restored: usize,
        #[source]
        source: StoreError,
    },

    #[error("Malformed member record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("A member named '{0}' already exists")]
    DuplicateName(String),

    #[error("Member {member_id} already has a measurement at {timestamp}")]
    DuplicateTimestamp {
        member_id: String,
        timestamp: DateTime<Utc>,
    },

    #[error("Member {member_id} has no measurement at {timestamp}")]
    MeasurementNotFound {
        member_id: String,
        timestamp: DateTime<Utc>,
    },

    #[error("The baseline measurement of member {0} cannot be deleted")]
    BaselineImmutable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GrowthError>;

/// Attaches the step being attempted to a failed store call
pub trait StoreContext<T> {
    fn with_step<F, S>(self, step: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> StoreContext<T> for std::result::Result<T, StoreError> {
    fn with_step<F, S>(self, step: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| GrowthError::Store {
            step: step().into(),
            source,
        })
    }
}

impl GrowthError {
    /// True for conditions detected locally before any store mutation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GrowthError::InsufficientData { .. }
                | GrowthError::DegenerateFit { .. }
                | GrowthError::HorizonOutOfRange { .. }
                | GrowthError::MalformedDocument(_)
                | GrowthError::OwnerMismatch { .. }
                | GrowthError::InvalidMeasurement(_)
                | GrowthError::InvalidProfile(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_mismatch_display() {
        let err = GrowthError::OwnerMismatch {
            expected: "alice".to_string(),
            found: Some("bob".to_string()),
        };
        assert!(err.to_string().contains("alice"));
        assert!(err.to_string().contains("bob"));

        let err = GrowthError::OwnerMismatch {
            expected: "alice".to_string(),
            found: None,
        };
        assert!(err.to_string().contains("none"));
    }

    #[test]
    fn test_store_context_names_step() {
        let failed: std::result::Result<(), StoreError> =
            Err(StoreError::Unavailable("timeout".to_string()));
        let err = failed.with_step(|| "query members").unwrap_err();

        assert!(matches!(err, GrowthError::Store { ref step, .. } if step == "query members"));
        assert!(err.to_string().contains("timeout"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_restore_aborted_display() {
        let err = GrowthError::RestoreAborted {
            phase: RestorePhase::WriteRestored,
            index: 2,
            deleted: 3,
            restored: 2,
            source: StoreError::PermissionDenied("members".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("write restored members"));
        assert!(message.contains("item 2"));
    }
}
