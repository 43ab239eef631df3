use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{DocumentStore, Fields, StoreError, StoredDocument};
use crate::error::{GrowthError, Result, StoreContext};
use crate::models::{calculate_bmi, parse_backup_timestamp, Gender, Measurement, Member, UpdateMember};

const NAME_FIELD: &str = "name";
const DOB_FIELD: &str = "dob";
const GENDER_FIELD: &str = "gender";
const BASELINE_FIELD: &str = "initialData";
const INCREMENTAL_FIELD: &str = "growthData";
const CREATED_AT_FIELD: &str = "createdAt";

/// Member as written to the store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDocument {
    pub user_id: String,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub initial_data: MeasurementDocument,
    pub growth_data: Vec<MeasurementDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasurementDocument {
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub date: DateTime<Utc>,
}

impl From<&Measurement> for MeasurementDocument {
    fn from(m: &Measurement) -> Self {
        Self {
            height: m.height,
            weight: m.weight,
            bmi: m.bmi,
            date: m.timestamp,
        }
    }
}

impl MemberDocument {
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        dob: NaiveDate,
        gender: Gender,
        baseline: &Measurement,
        incremental: &[Measurement],
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id: owner_id.into(),
            name: name.into(),
            dob,
            gender,
            initial_data: MeasurementDocument::from(baseline),
            growth_data: incremental.iter().map(MeasurementDocument::from).collect(),
            created_at,
        }
    }

    pub fn to_fields(&self) -> Result<Fields> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(GrowthError::MalformedDocument(
                "member did not serialize to an object".to_string(),
            )),
        }
    }
}

/// Typed access to member documents.
///
/// Documents are duck-typed in the store; everything leaving this type is a
/// well-formed `Member`. Incremental measurements missing a height, weight or
/// date are dropped here.
#[derive(Clone, Debug)]
pub struct MemberRepository<S> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> MemberRepository<S> {
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Every well-formed member of the owner, in store order
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Member>> {
        let docs = self
            .store
            .query_by_owner(&self.collection, owner_id)
            .await
            .with_step(|| format!("query members of {}", owner_id))?;

        let mut members = Vec::with_capacity(docs.len());
        for doc in &docs {
            match member_from_document(doc) {
                Ok(member) => members.push(member),
                Err(reason) => warn!("Skipping malformed member {}: {}", doc.id, reason),
            }
        }
        Ok(members)
    }

    /// Ids of every document the owner holds, well-formed or not
    pub async fn document_ids_by_owner(&self, owner_id: &str) -> Result<Vec<String>> {
        let docs = self
            .store
            .query_by_owner(&self.collection, owner_id)
            .await
            .with_step(|| format!("query members of {}", owner_id))?;
        Ok(docs.into_iter().map(|doc| doc.id).collect())
    }

    /// A member owned by someone else is reported as not found
    pub async fn get(&self, owner_id: &str, member_id: &str) -> Result<Member> {
        let doc = self
            .store
            .get(&self.collection, member_id)
            .await
            .with_step(|| format!("load member {}", member_id))?;

        if doc.owner_id() != Some(owner_id) {
            return Err(GrowthError::Store {
                step: format!("load member {}", member_id),
                source: StoreError::NotFound {
                    collection: self.collection.clone(),
                    id: member_id.to_string(),
                },
            });
        }

        member_from_document(&doc).map_err(|reason| GrowthError::MalformedRecord {
            id: doc.id.clone(),
            reason,
        })
    }

    pub async fn insert(&self, document: &MemberDocument) -> Result<String> {
        let fields = document.to_fields()?;
        self.insert_fields(fields)
            .await
            .with_step(|| format!("insert member {}", document.name))
    }

    /// Writes an already serialized member document
    pub async fn insert_fields(&self, fields: Fields) -> std::result::Result<String, StoreError> {
        let id = self.store.add(&self.collection, fields).await?;
        debug!("Inserted member {}", id);
        Ok(id)
    }

    pub async fn update_profile(&self, member_id: &str, update: &UpdateMember) -> Result<()> {
        let mut patch = Fields::new();
        if let Some(name) = &update.name {
            patch.insert(NAME_FIELD.to_string(), json!(name));
        }
        if let Some(dob) = update.date_of_birth {
            patch.insert(DOB_FIELD.to_string(), json!(dob));
        }
        if let Some(gender) = update.gender {
            patch.insert(GENDER_FIELD.to_string(), json!(gender));
        }

        self.store
            .update(&self.collection, member_id, patch)
            .await
            .with_step(|| format!("update profile of member {}", member_id))
    }

    pub async fn append_measurement(&self, member_id: &str, measurement: &Measurement) -> Result<()> {
        let value = serde_json::to_value(MeasurementDocument::from(measurement))?;
        self.store
            .append_to_array(&self.collection, member_id, INCREMENTAL_FIELD, value)
            .await
            .with_step(|| format!("append measurement to member {}", member_id))
    }

    /// Overwrites the whole incremental list
    pub async fn replace_incremental(&self, member_id: &str, measurements: &[Measurement]) -> Result<()> {
        let values = measurements
            .iter()
            .map(|m| serde_json::to_value(MeasurementDocument::from(m)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut patch = Fields::new();
        patch.insert(INCREMENTAL_FIELD.to_string(), Value::Array(values));
        self.store
            .update(&self.collection, member_id, patch)
            .await
            .with_step(|| format!("rewrite measurements of member {}", member_id))
    }

    pub async fn remove(&self, member_id: &str) -> std::result::Result<(), StoreError> {
        self.store.delete(&self.collection, member_id).await?;
        debug!("Deleted member {}", member_id);
        Ok(())
    }
}

fn member_from_document(doc: &StoredDocument) -> std::result::Result<Member, String> {
    let fields = &doc.fields;
    let owner_id = doc.owner_id().ok_or("missing owner")?;

    let name = fields
        .get(NAME_FIELD)
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .ok_or("missing name")?;

    let date_of_birth = fields
        .get(DOB_FIELD)
        .and_then(Value::as_str)
        .and_then(|dob| NaiveDate::parse_from_str(dob, "%Y-%m-%d").ok())
        .ok_or("missing or unreadable date of birth")?;

    let gender = fields
        .get(GENDER_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| "missing gender".to_string())?
        .parse::<Gender>()?;

    let baseline_measurement = fields
        .get(BASELINE_FIELD)
        .and_then(measurement_from_value)
        .ok_or("missing or incomplete baseline measurement")?;

    let raw_incremental: &[Value] = match fields.get(INCREMENTAL_FIELD) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => return Err("growth data is not a list".to_string()),
    };
    let incremental_measurements: Vec<Measurement> =
        raw_incremental.iter().filter_map(measurement_from_value).collect();
    let skipped = raw_incremental.len() - incremental_measurements.len();
    if skipped > 0 {
        warn!("Member {} has {} incomplete measurements, ignoring them", doc.id, skipped);
    }

    Ok(Member {
        id: doc.id.clone(),
        owner_id: owner_id.to_string(),
        name: name.to_string(),
        date_of_birth,
        gender,
        baseline_measurement,
        incremental_measurements,
        created_at: fields.get(CREATED_AT_FIELD).and_then(timestamp_from_value),
    })
}

/// `None` when height, weight or date is missing; BMI is derived if absent
fn measurement_from_value(value: &Value) -> Option<Measurement> {
    let height = value.get("height")?.as_f64()?;
    let weight = value.get("weight")?.as_f64()?;
    let timestamp = timestamp_from_value(value.get("date")?)?;
    let bmi = value
        .get("bmi")
        .and_then(Value::as_f64)
        .unwrap_or_else(|| calculate_bmi(height, weight));

    Some(Measurement {
        height,
        weight,
        bmi,
        timestamp,
    })
}

/// RFC 3339 or `YYYY-MM-DD HH:mm:ss` strings, or `{seconds, nanoseconds}` objects
fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_backup_timestamp(text),
        Value::Object(parts) => {
            let seconds = parts.get("seconds")?.as_i64()?;
            let nanos = parts
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            DateTime::from_timestamp(seconds, nanos)
        }
        _ => None,
    }
}
