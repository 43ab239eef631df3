// Shared helpers for the integration tests
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use growth_tracker::models::{Gender, Measurement};
use growth_tracker::store::{
    DocumentStore, Fields, MemberDocument, MemberRepository, MemoryDocumentStore, StoreError,
    StoredDocument,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, Once};

pub const COLLECTION: &str = "members";

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap()
}

/// Mock data generators
pub struct MockDataGenerator;

impl MockDataGenerator {
    /// A member document with a baseline and the given later measurements
    pub fn member(owner_id: &str, name: &str, baseline: Measurement, later: &[Measurement]) -> MemberDocument {
        MemberDocument::new(
            owner_id,
            name,
            NaiveDate::from_ymd_opt(2019, 5, 20).unwrap(),
            Gender::Female,
            &baseline,
            later,
            Some(baseline.timestamp),
        )
    }

    /// Member with just a baseline taken on 2023-01-10
    pub fn simple_member(owner_id: &str, name: &str) -> MemberDocument {
        Self::member(owner_id, name, Measurement::new(100.0, 15.0, at(2023, 1, 10)), &[])
    }
}

/// Repository over a fresh in-memory store
pub fn memory_repository() -> MemberRepository<MemoryDocumentStore> {
    MemberRepository::new(MemoryDocumentStore::new(), COLLECTION)
}

/// Store call recorded by `FaultyStore`
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Add(String),
    Delete(String),
}

/// In-memory store that can be told to start failing adds or deletes after
/// a number of successful calls. Every successful add and delete is logged.
#[derive(Clone, Default)]
pub struct FaultyStore {
    inner: MemoryDocumentStore,
    adds_left: Arc<Mutex<Option<usize>>>,
    deletes_left: Arc<Mutex<Option<usize>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_adds_after(&self, successes: usize) {
        *self.adds_left.lock().unwrap() = Some(successes);
    }

    pub fn fail_deletes_after(&self, successes: usize) {
        *self.deletes_left.lock().unwrap() = Some(successes);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn consume_success(left: &Mutex<Option<usize>>) -> Result<(), StoreError> {
        let mut left = left.lock().unwrap();
        match left.as_mut() {
            Some(0) => Err(StoreError::Unavailable("injected failure".to_string())),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl DocumentStore for FaultyStore {
    async fn query_by_owner(&self, collection: &str, owner_id: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.query_by_owner(collection, owner_id).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<StoredDocument, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        Self::consume_success(&self.adds_left)?;
        let id = self.inner.add(collection, fields).await?;
        self.calls.lock().unwrap().push(StoreCall::Add(id.clone()));
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        self.inner.update(collection, id, patch).await
    }

    async fn append_to_array(&self, collection: &str, id: &str, field: &str, value: Value) -> Result<(), StoreError> {
        self.inner.append_to_array(collection, id, field, value).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        Self::consume_success(&self.deletes_left)?;
        self.inner.delete(collection, id).await?;
        self.calls.lock().unwrap().push(StoreCall::Delete(id.to_string()));
        Ok(())
    }
}
