use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::GrowthConfig;
use crate::error::{GrowthError, RestorePhase, Result};
use crate::models::{BackupDocument, BackupMember};
use crate::store::{DocumentStore, MemberDocument, MemberRepository};

/// Result of a completed restore
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreReport {
    pub deleted: usize,
    /// Freshly assigned ids, in backup order
    pub restored_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Restored(RestoreReport),
    /// The owner declined to overwrite their existing members
    Cancelled { existing: usize },
}

/// Checks the raw shape of a backup before anything is decoded or deleted
pub fn validate_backup(doc: &Value, expected_owner_id: &str) -> Result<()> {
    let object = doc
        .as_object()
        .ok_or_else(|| GrowthError::MalformedDocument("backup is not a JSON object".to_string()))?;

    match object.get("members") {
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(GrowthError::MalformedDocument(
                "members is not a list".to_string(),
            ))
        }
        None => {
            return Err(GrowthError::MalformedDocument(
                "members list is missing".to_string(),
            ))
        }
    }

    let found = match object.get("ownerId").or_else(|| object.get("userId")) {
        Some(Value::String(owner)) => Some(owner.as_str()),
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err(GrowthError::MalformedDocument(
                "owner id is not a string".to_string(),
            ))
        }
    };
    if found != Some(expected_owner_id) {
        return Err(GrowthError::OwnerMismatch {
            expected: expected_owner_id.to_string(),
            found: found.map(str::to_string),
        });
    }

    Ok(())
}

/// Parse, validate and decode backup bytes. Every member and timestamp must
/// decode, so a bad file is rejected before any restore step runs.
pub fn decode_backup(bytes: &[u8], expected_owner_id: &str) -> Result<BackupDocument> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| GrowthError::MalformedDocument(format!("not valid JSON: {}", e)))?;

    validate_backup(&value, expected_owner_id)?;

    let doc: BackupDocument = serde_json::from_value(value)
        .map_err(|e| GrowthError::MalformedDocument(e.to_string()))?;

    for member in &doc.members {
        member.measurements()?;
    }

    Ok(doc)
}

pub fn encode_backup(doc: &BackupDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Export and restore of a whole account
#[derive(Clone, Debug)]
pub struct BackupService<S> {
    repository: MemberRepository<S>,
}

impl<S: DocumentStore> BackupService<S> {
    pub fn new(repository: MemberRepository<S>) -> Self {
        Self { repository }
    }

    pub fn from_config(store: S, config: &GrowthConfig) -> Self {
        Self::new(MemberRepository::new(store, config.members_collection.clone()))
    }

    pub fn repository(&self) -> &MemberRepository<S> {
        &self.repository
    }

    pub async fn export_account(&self, owner_id: &str) -> Result<BackupDocument> {
        self.export_account_at(owner_id, Utc::now()).await
    }

    /// Same data and `created_at` give the same document
    pub async fn export_account_at(
        &self,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<BackupDocument> {
        let members = self.repository.list_by_owner(owner_id).await?;
        let snapshots: Vec<BackupMember> = members.iter().map(BackupMember::from).collect();

        info!("Exported {} members of {}", snapshots.len(), owner_id);
        Ok(BackupDocument::new(owner_id, created_at, snapshots))
    }

    /// Replace every member of `owner_id` with the members in `doc`.
    ///
    /// Destructive. When the owner already has members the caller must have
    /// confirmed the overwrite. Existing members are all deleted before the
    /// first restored member is written. Store calls are independent: the
    /// first failure stops the restore and nothing already applied is undone.
    pub async fn restore_account(&self, owner_id: &str, doc: &BackupDocument) -> Result<RestoreReport> {
        doc.validate_owner(owner_id)?;

        let documents = doc
            .members
            .iter()
            .map(|member| member_document(owner_id, member)?.to_fields())
            .collect::<Result<Vec<_>>>()?;

        let existing = self.repository.document_ids_by_owner(owner_id).await?;
        if !existing.is_empty() {
            warn!("Deleting {} existing members of {} before restore", existing.len(), owner_id);
        }

        let mut deleted = 0;
        for (index, id) in existing.iter().enumerate() {
            self.repository
                .remove(id)
                .await
                .map_err(|source| GrowthError::RestoreAborted {
                    phase: RestorePhase::DeleteExisting,
                    index,
                    deleted,
                    restored: 0,
                    source,
                })?;
            deleted += 1;
        }

        let mut restored_ids = Vec::with_capacity(documents.len());
        for (index, fields) in documents.into_iter().enumerate() {
            let id = self
                .repository
                .insert_fields(fields)
                .await
                .map_err(|source| GrowthError::RestoreAborted {
                    phase: RestorePhase::WriteRestored,
                    index,
                    deleted,
                    restored: restored_ids.len(),
                    source,
                })?;
            restored_ids.push(id);
        }

        info!(
            "Restored {} members for {} ({} replaced)",
            restored_ids.len(),
            owner_id,
            deleted
        );
        Ok(RestoreReport {
            deleted,
            restored_ids,
        })
    }

    /// Full import flow for a backup file.
    ///
    /// `confirm` is asked only when the owner already has members and receives
    /// their count; returning `false` leaves the account untouched.
    pub async fn import_backup<F>(&self, owner_id: &str, bytes: &[u8], confirm: F) -> Result<RestoreOutcome>
    where
        F: FnOnce(usize) -> bool,
    {
        let doc = decode_backup(bytes, owner_id)?;

        let existing = self.repository.document_ids_by_owner(owner_id).await?.len();
        if existing > 0 && !confirm(existing) {
            info!("Restore for {} cancelled, keeping {} members", owner_id, existing);
            return Ok(RestoreOutcome::Cancelled { existing });
        }

        self.restore_account(owner_id, &doc)
            .await
            .map(RestoreOutcome::Restored)
    }
}

/// Backup member to a new store document owned by `owner_id`; the id in the
/// backup is dropped
fn member_document(owner_id: &str, member: &BackupMember) -> Result<MemberDocument> {
    let (baseline, incremental) = member.measurements()?;
    Ok(MemberDocument::new(
        owner_id,
        member.name.clone(),
        member.date_of_birth,
        member.gender,
        &baseline,
        &incremental,
        member.created_at(),
    ))
}
