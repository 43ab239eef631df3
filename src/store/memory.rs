use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use uuid::Uuid;

use super::{DocumentStore, Fields, StoreError, StoredDocument};

type Collections = HashMap<String, Vec<StoredDocument>>;

/// In-memory DocumentStore for tests and embedding.
///
/// Documents keep insertion order within a collection, so queries return
/// members in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of documents in a collection, regardless of owner
    pub fn len(&self, collection: &str) -> Result<usize, StoreError> {
        Ok(self.lock()?.get(collection).map_or(0, Vec::len))
    }

    pub fn is_empty(&self, collection: &str) -> Result<bool, StoreError> {
        Ok(self.len(collection)? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn query_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.owner_id() == Some(owner_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<StoredDocument, StoreError> {
        let collections = self.lock()?;
        collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.lock()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
            .ok_or_else(|| not_found(collection, id))?;

        for (key, value) in patch {
            doc.fields.insert(key, value);
        }
        Ok(())
    }

    async fn append_to_array(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
            .ok_or_else(|| not_found(collection, id))?;

        match doc
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(StoreError::Backend(format!(
                "field '{}' of {} is not an array",
                field, id
            ))),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;

        let position = docs
            .iter()
            .position(|doc| doc.id == id)
            .ok_or_else(|| not_found(collection, id))?;
        docs.remove(position);
        Ok(())
    }
}
