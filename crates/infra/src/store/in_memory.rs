use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use uuid::Uuid;

use toyshelf_query::{Filter, FindSpec, Pipeline, UpdateSpec};

use super::eval;
use super::r#trait::{Collection, DocumentStore, StoreError, UpdateOutcome};

type Collections = HashMap<Collection, Vec<Value>>;

/// In-memory document store.
///
/// Intended for tests/dev and the default server backend. Documents keep
/// insertion order, which is the "natural order" ties fall back to.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        Ok(self.read()?.get(&collection).map(Vec::len).unwrap_or(0))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| eval::matches(doc, filter)))
            .cloned())
    }

    async fn find(&self, collection: Collection, spec: &FindSpec) -> Result<Vec<Value>, StoreError> {
        let collections = self.read()?;
        let docs = collections.get(&collection).map(Vec::as_slice).unwrap_or(&[]);
        Ok(eval::run_find(docs.iter(), spec))
    }

    async fn aggregate(
        &self,
        collection: Collection,
        pipeline: &Pipeline,
    ) -> Result<Vec<Value>, StoreError> {
        let docs = self
            .read()?
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        eval::run_pipeline(docs, pipeline)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Value,
        unique: Option<&Filter>,
    ) -> Result<(), StoreError> {
        let Some(fields) = document.as_object_mut() else {
            return Err(StoreError::InvalidDocument(format!(
                "{collection} documents must be objects"
            )));
        };
        let id = fields
            .entry("_id")
            .or_insert_with(|| Value::String(Uuid::now_v7().to_string()))
            .clone();

        let mut collections = self.write()?;
        let docs = collections.entry(collection).or_default();

        let taken = docs
            .iter()
            .any(|doc| doc.get("_id").is_some_and(|existing| eval::values_equal(existing, &id)));
        if taken {
            return Err(StoreError::Duplicate {
                collection,
                key: id.to_string(),
            });
        }
        if let Some(unique) = unique {
            if docs.iter().any(|doc| eval::matches(doc, unique)) {
                return Err(StoreError::Duplicate {
                    collection,
                    key: unique.to_document().to_string(),
                });
            }
        }

        docs.push(document);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &UpdateSpec,
        upsert: bool,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut collections = self.write()?;
        let docs = collections.entry(collection).or_default();

        if let Some(doc) = docs.iter_mut().find(|doc| eval::matches(doc, filter)) {
            // Work on a copy so a failing operator leaves the stored document intact.
            let mut updated = doc.clone();
            let modified = eval::apply_update(&mut updated, update)?;
            *doc = updated;
            return Ok(UpdateOutcome {
                matched: true,
                modified,
                upserted: false,
            });
        }

        if !upsert {
            return Ok(UpdateOutcome::default());
        }

        let mut created = eval::upsert_seed(filter)?;
        eval::apply_update(&mut created, update)?;
        if let Some(fields) = created.as_object_mut() {
            fields
                .entry("_id")
                .or_insert_with(|| Value::String(Uuid::now_v7().to_string()));
        }
        docs.push(created);
        Ok(UpdateOutcome {
            matched: false,
            modified: false,
            upserted: true,
        })
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<bool, StoreError> {
        let mut collections = self.write()?;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        match docs.iter().position(|doc| eval::matches(doc, filter)) {
            Some(idx) => {
                docs.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
