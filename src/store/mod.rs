// Record store adapter: the document store seam and its typed member mapping

mod memory;
mod member_repository;

pub use memory::MemoryDocumentStore;
pub use member_repository::{MeasurementDocument, MemberDocument, MemberRepository};

use serde_json::{Map, Value};
use thiserror::Error;

/// Top-level fields of a stored document
pub type Fields = Map<String, Value>;

/// Field holding the owning account id on every member document
pub const OWNER_FIELD: &str = "userId";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Document {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// A document as returned by the store: its id plus arbitrary fields
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

impl StoredDocument {
    pub fn owner_id(&self) -> Option<&str> {
        self.fields.get(OWNER_FIELD).and_then(Value::as_str)
    }
}

/// External document store. Reads are assumed consistent after writes from
/// the same client; no operation spans more than one document.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn query_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<StoredDocument, StoreError>;

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Shallow merge of `patch` into the document's top-level fields
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError>;

    async fn append_to_array(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
