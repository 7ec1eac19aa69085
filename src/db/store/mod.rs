//! Document store abstraction.
//!
//! Records live in flat, named collections and are addressed by a generated
//! string key. There is no schema and no secondary index: field lookups fetch
//! the whole collection and scan it in memory.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgDocumentStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

pub const USERS: &str = "users";
pub const ASSETS: &str = "assets";
pub const REQUESTS: &str = "requests";
pub const USER_ASSETS: &str = "user_assets";
pub const PAYMENTS: &str = "payments";

/// Field map of a single record, without its key.
pub type Fields = Map<String, Value>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Precondition failed on {collection}/{id}.{field}")]
    Conflict {
        collection: String,
        id: String,
        field: String,
    },

    #[error("Record {collection}/{id} could not be decoded: {message}")]
    Decode {
        collection: String,
        id: String,
        message: String,
    },
}

/// A stored record: its key plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Value of a field, `Value::Null` when absent.
    pub fn field(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&Value::Null)
    }

    /// Decode into a typed model. The key is exposed to the model as `id`.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<T> {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(map)).map_err(|e| StoreError::Decode {
            collection: collection.to_string(),
            id: self.id.clone(),
            message: e.to_string(),
        })
    }
}

/// Decode every record, skipping the ones that do not fit the model.
pub fn decode_all<T: DeserializeOwned>(collection: &str, records: &[Record]) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match record.decode(collection) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("Skipping malformed record: {}", e);
                None
            }
        })
        .collect()
}

/// Serialize a model into storable fields. The `id` key and null values are dropped.
pub fn to_fields<T: Serialize>(model: &T) -> StoreResult<Fields> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(clean_fields(map)),
        other => {
            let mut map = Fields::new();
            map.insert("value".to_string(), other);
            Ok(map)
        }
    }
}

/// Field map from a JSON object. Nulls are kept so updates can remove fields.
pub fn fields_of(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// Strip the key and null values from a field map about to be created or set.
pub(crate) fn clean_fields(mut fields: Fields) -> Fields {
    fields.remove("id");
    fields.retain(|_, v| !v.is_null());
    fields
}

/// Merge `patch` into `target`. A null in the patch removes the field.
pub(crate) fn merge_fields(target: &mut Fields, patch: Fields) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

/// Fresh record key.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A condition that must hold for a [`Batch`] to be applied.
///
/// `expected == Value::Null` means the field must be absent (or the record missing).
#[derive(Debug, Clone, PartialEq)]
pub struct Precondition {
    pub collection: String,
    pub id: String,
    pub field: String,
    pub expected: Value,
}

impl Precondition {
    pub fn field_equals(
        collection: &str,
        id: &str,
        field: &str,
        expected: Value,
    ) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            expected,
        }
    }

    pub(crate) fn holds(&self, current: Option<&Fields>) -> bool {
        let actual = current
            .and_then(|fields| fields.get(&self.field))
            .unwrap_or(&Value::Null);
        *actual == self.expected
    }

    pub(crate) fn conflict(&self) -> StoreError {
        StoreError::Conflict {
            collection: self.collection.clone(),
            id: self.id.clone(),
            field: self.field.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create or overwrite the record.
    Set {
        collection: String,
        id: String,
        fields: Fields,
    },
    /// Merge fields into the record, creating it if missing.
    Update {
        collection: String,
        id: String,
        fields: Fields,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// Preconditions plus writes, applied all-or-nothing by [`DocumentStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub preconditions: Vec<Precondition>,
    pub writes: Vec<Write>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, collection: &str, id: &str, field: &str, expected: Value) -> Self {
        self.preconditions
            .push(Precondition::field_equals(collection, id, field, expected));
        self
    }

    pub fn set(mut self, collection: &str, id: &str, fields: Fields) -> Self {
        self.writes.push(Write::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn update(mut self, collection: &str, id: &str, fields: Fields) -> Self {
        self.writes.push(Write::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn delete(mut self, collection: &str, id: &str) -> Self {
        self.writes.push(Write::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }
}

/// Trait for the hierarchical key-value document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `fields` under a freshly generated key and return the new record.
    async fn create_data(&self, collection: &str, fields: Fields) -> StoreResult<Record>;

    /// Create or overwrite the record stored under `id`.
    async fn set_data(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Record>;

    /// Every record of the collection; empty when the collection does not exist.
    async fn get_all_data(&self, collection: &str) -> StoreResult<Vec<Record>>;

    async fn get_data_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Record>>;

    /// Merge fields into the record. Does not check that the record existed.
    async fn update_data(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Remove the record. Nothing depending on it is touched.
    async fn delete_data(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Apply every write of the batch if and only if every precondition holds.
    async fn commit(&self, batch: Batch) -> StoreResult<()>;

    /// Readiness check.
    async fn ping(&self) -> StoreResult<()>;

    /// Release backend resources.
    async fn close(&self) {}

    /// All records whose `field` equals `value` (full collection scan).
    async fn get_data_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>> {
        let records = self.get_all_data(collection).await?;
        Ok(records
            .into_iter()
            .filter(|record| record.field(field) == value)
            .collect())
    }

    /// First record whose `email` matches.
    async fn get_data_by_email(&self, collection: &str, email: &str) -> StoreResult<Option<Record>> {
        let records = self.get_all_data(collection).await?;
        Ok(records
            .into_iter()
            .find(|record| record.field("email").as_str() == Some(email)))
    }

    async fn get_data_by_company(&self, collection: &str, company_name: &str) -> StoreResult<Vec<Record>> {
        self.get_data_by_field(collection, "company_name", &Value::String(company_name.to_string()))
            .await
    }
}
