//! In-memory document store

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{
    clean_fields, merge_fields, new_id, Batch, DocumentStore, Fields, Record, StoreResult, Write,
};

#[derive(Default)]
struct Collection {
    /// Keys in insertion order.
    order: Vec<String>,
    docs: HashMap<String, Fields>,
}

impl Collection {
    fn set(&mut self, id: &str, fields: Fields) {
        if self.docs.insert(id.to_string(), fields).is_none() {
            self.order.push(id.to_string());
        }
    }

    fn update(&mut self, id: &str, patch: Fields) {
        match self.docs.get_mut(id) {
            Some(existing) => merge_fields(existing, patch),
            None => self.set(id, clean_fields(patch)),
        }
    }

    fn delete(&mut self, id: &str) {
        if self.docs.remove(id).is_some() {
            self.order.retain(|key| key != id);
        }
    }
}

/// In-memory store, shared behind a single lock so batches are atomic.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Collection>> {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Collection>> {
        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn apply(collections: &mut HashMap<String, Collection>, write: Write) {
    match write {
        Write::Set { collection, id, fields } => collections
            .entry(collection)
            .or_default()
            .set(&id, clean_fields(fields)),
        Write::Update { collection, id, fields } => {
            collections.entry(collection).or_default().update(&id, fields)
        }
        Write::Delete { collection, id } => {
            if let Some(c) = collections.get_mut(&collection) {
                c.delete(&id);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_data(&self, collection: &str, fields: Fields) -> StoreResult<Record> {
        let id = new_id();
        self.set_data(collection, &id, fields).await
    }

    async fn set_data(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Record> {
        let fields = clean_fields(fields);
        self.write()
            .entry(collection.to_string())
            .or_default()
            .set(id, fields.clone());
        Ok(Record::new(id, fields))
    }

    async fn get_all_data(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let collections = self.read();
        let Some(c) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(c.order
            .iter()
            .filter_map(|id| c.docs.get(id).map(|fields| Record::new(id.clone(), fields.clone())))
            .collect())
    }

    async fn get_data_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        Ok(self
            .read()
            .get(collection)
            .and_then(|c| c.docs.get(id))
            .map(|fields| Record::new(id, fields.clone())))
    }

    async fn update_data(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        self.write()
            .entry(collection.to_string())
            .or_default()
            .update(id, fields);
        Ok(())
    }

    async fn delete_data(&self, collection: &str, id: &str) -> StoreResult<()> {
        if let Some(c) = self.write().get_mut(collection) {
            c.delete(id);
        }
        Ok(())
    }

    async fn commit(&self, batch: Batch) -> StoreResult<()> {
        let mut collections = self.write();
        for pre in &batch.preconditions {
            let current = collections
                .get(&pre.collection)
                .and_then(|c| c.docs.get(&pre.id));
            if !pre.holds(current) {
                return Err(pre.conflict());
            }
        }
        for write in batch.writes {
            apply(&mut collections, write);
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
