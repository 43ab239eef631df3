use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::GrowthConfig;
use crate::error::{GrowthError, Result, StoreContext};
use crate::models::{GrowthPrediction, Measurement, Member, NewMember, Timeline, UpdateMember};
use crate::services::{csv_export_service, prediction_service, timeline_service, PREDICTION_HORIZONS};
use crate::store::{DocumentStore, MemberDocument, MemberRepository};

/// Member lifecycle and per-member views for one store
#[derive(Clone, Debug)]
pub struct MemberService<S> {
    repository: MemberRepository<S>,
    default_horizon_months: u32,
}

impl<S: DocumentStore> MemberService<S> {
    pub fn new(repository: MemberRepository<S>) -> Self {
        Self {
            repository,
            default_horizon_months: PREDICTION_HORIZONS[0],
        }
    }

    /// Service over the configured members collection and default horizon
    pub fn from_config(store: S, config: &GrowthConfig) -> Self {
        Self {
            repository: MemberRepository::new(store, config.members_collection.clone()),
            default_horizon_months: config.default_horizon_months,
        }
    }

    pub fn default_horizon_months(&self) -> u32 {
        self.default_horizon_months
    }

    pub fn repository(&self) -> &MemberRepository<S> {
        &self.repository
    }

    pub async fn register_member(&self, owner_id: &str, request: NewMember) -> Result<Member> {
        self.register_member_at(owner_id, request, Utc::now()).await
    }

    /// Register a member whose baseline is measured at `at`.
    /// Names are unique per owner.
    pub async fn register_member_at(
        &self,
        owner_id: &str,
        request: NewMember,
        at: DateTime<Utc>,
    ) -> Result<Member> {
        let name = validate_name(&request.name)?;
        validate_body(request.height, request.weight)?;

        let existing = self.repository.list_by_owner(owner_id).await?;
        if existing.iter().any(|m| m.name == name) {
            return Err(GrowthError::DuplicateName(name));
        }

        let baseline = Measurement::new(request.height, request.weight, at);
        let document = MemberDocument::new(
            owner_id,
            name.clone(),
            request.date_of_birth,
            request.gender,
            &baseline,
            &[],
            Some(at),
        );
        let id = self.repository.insert(&document).await?;

        info!("Registered member {} ({}) for {}", id, name, owner_id);
        Ok(Member {
            id,
            owner_id: owner_id.to_string(),
            name,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            baseline_measurement: baseline,
            incremental_measurements: Vec::new(),
            created_at: Some(at),
        })
    }

    pub async fn record_measurement(
        &self,
        owner_id: &str,
        member_id: &str,
        height: f64,
        weight: f64,
    ) -> Result<Measurement> {
        self.record_measurement_at(owner_id, member_id, height, weight, Utc::now())
            .await
    }

    /// Append a measurement taken at `at`; BMI is derived from the inputs
    pub async fn record_measurement_at(
        &self,
        owner_id: &str,
        member_id: &str,
        height: f64,
        weight: f64,
        at: DateTime<Utc>,
    ) -> Result<Measurement> {
        validate_body(height, weight)?;

        let member = self.repository.get(owner_id, member_id).await?;
        if member.has_measurement_at(at) {
            return Err(GrowthError::DuplicateTimestamp {
                member_id: member_id.to_string(),
                timestamp: at,
            });
        }

        let measurement = Measurement::new(height, weight, at);
        self.repository
            .append_measurement(member_id, &measurement)
            .await?;

        info!("Recorded measurement for member {} at {}", member_id, at);
        Ok(measurement)
    }

    /// Remove the incremental measurement taken at `timestamp`
    pub async fn delete_measurement(
        &self,
        owner_id: &str,
        member_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let member = self.repository.get(owner_id, member_id).await?;
        if member.baseline_measurement.timestamp == timestamp {
            return Err(GrowthError::BaselineImmutable(member_id.to_string()));
        }

        let remaining: Vec<Measurement> = member
            .incremental_measurements
            .iter()
            .filter(|m| m.timestamp != timestamp)
            .cloned()
            .collect();
        if remaining.len() == member.incremental_measurements.len() {
            return Err(GrowthError::MeasurementNotFound {
                member_id: member_id.to_string(),
                timestamp,
            });
        }

        self.repository
            .replace_incremental(member_id, &remaining)
            .await?;

        info!("Deleted measurement of member {} at {}", member_id, timestamp);
        Ok(())
    }

    pub async fn update_profile(
        &self,
        owner_id: &str,
        member_id: &str,
        mut update: UpdateMember,
    ) -> Result<Member> {
        let member = self.repository.get(owner_id, member_id).await?;

        if let Some(name) = update.name.take() {
            let name = validate_name(&name)?;
            if name != member.name {
                let others = self.repository.list_by_owner(owner_id).await?;
                if others.iter().any(|m| m.id != member.id && m.name == name) {
                    return Err(GrowthError::DuplicateName(name));
                }
            }
            update.name = Some(name);
        }

        if update.is_empty() {
            return Ok(member);
        }

        self.repository.update_profile(member_id, &update).await?;
        info!("Updated profile of member {}", member_id);
        self.repository.get(owner_id, member_id).await
    }

    /// Deletes the member together with its embedded measurements
    pub async fn delete_member(&self, owner_id: &str, member_id: &str) -> Result<()> {
        self.repository.get(owner_id, member_id).await?;
        self.repository
            .remove(member_id)
            .await
            .with_step(|| format!("delete member {}", member_id))?;

        info!("Deleted member {} of {}", member_id, owner_id);
        Ok(())
    }

    pub async fn get_member(&self, owner_id: &str, member_id: &str) -> Result<Member> {
        self.repository.get(owner_id, member_id).await
    }

    /// All members of the owner, sorted by name
    pub async fn list_members(&self, owner_id: &str) -> Result<Vec<Member>> {
        let mut members = self.repository.list_by_owner(owner_id).await?;
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    pub async fn timeline(&self, owner_id: &str, member_id: &str) -> Result<Timeline> {
        let member = self.repository.get(owner_id, member_id).await?;
        Ok(timeline_service::build_timeline(&member))
    }

    pub async fn predict_growth(
        &self,
        owner_id: &str,
        member_id: &str,
        horizon_months: u32,
    ) -> Result<GrowthPrediction> {
        let member = self.repository.get(owner_id, member_id).await?;
        prediction_service::predict(&member, horizon_months)
    }

    /// Prediction over the configured default horizon
    pub async fn predict_growth_default(&self, owner_id: &str, member_id: &str) -> Result<GrowthPrediction> {
        self.predict_growth(owner_id, member_id, self.default_horizon_months)
            .await
    }

    /// CSV of every member of the owner, in store order
    pub async fn export_csv(&self, owner_id: &str) -> Result<String> {
        let members = self.repository.list_by_owner(owner_id).await?;
        Ok(csv_export_service::to_csv(&members))
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GrowthError::InvalidProfile("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_body(height: f64, weight: f64) -> Result<()> {
    if !(height.is_finite() && height > 0.0) {
        return Err(GrowthError::InvalidMeasurement(format!(
            "height must be a positive number, got {}",
            height
        )));
    }
    if !(weight.is_finite() && weight > 0.0) {
        return Err(GrowthError::InvalidMeasurement(format!(
            "weight must be a positive number, got {}",
            weight
        )));
    }
    Ok(())
}
