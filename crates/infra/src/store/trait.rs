use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use toyshelf_query::{Filter, FindSpec, Pipeline, UpdateSpec};

/// Collections the catalog reads and writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Blogs,
    UserBlogPins,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Blogs => "blogs",
            Collection::UserBlogPins => "user_blog_pins",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of an `update_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// A document matched the filter.
    pub matched: bool,
    /// The matched document actually changed.
    pub modified: bool,
    /// No document matched and one was created.
    pub upserted: bool,
}

/// Document store operation error.
///
/// These are **storage errors** as opposed to domain errors (validation,
/// lookups). Network/driver failures of a remote backend map to `Backend`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate key in {collection}: {key}")]
    Duplicate { collection: Collection, key: String },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Async document-store client.
///
/// Filters, find-specs, pipelines and updates arrive fully built; the store
/// only executes them.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError>;

    async fn find(&self, collection: Collection, spec: &FindSpec) -> Result<Vec<Value>, StoreError>;

    async fn aggregate(
        &self,
        collection: Collection,
        pipeline: &Pipeline,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert one document.
    ///
    /// Fails with `StoreError::Duplicate` when `_id` is taken or when a
    /// document already matches `unique`.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Value,
        unique: Option<&Filter>,
    ) -> Result<(), StoreError>;

    /// Apply `update` to the first document matching `filter`. With `upsert`,
    /// a missing document is created from the filter's equality conditions
    /// and then updated.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &UpdateSpec,
        upsert: bool,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Delete the first document matching `filter`. Returns whether one was removed.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        (**self).find_one(collection, filter).await
    }

    async fn find(&self, collection: Collection, spec: &FindSpec) -> Result<Vec<Value>, StoreError> {
        (**self).find(collection, spec).await
    }

    async fn aggregate(
        &self,
        collection: Collection,
        pipeline: &Pipeline,
    ) -> Result<Vec<Value>, StoreError> {
        (**self).aggregate(collection, pipeline).await
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Value,
        unique: Option<&Filter>,
    ) -> Result<(), StoreError> {
        (**self).insert_one(collection, document, unique).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &UpdateSpec,
        upsert: bool,
    ) -> Result<UpdateOutcome, StoreError> {
        (**self).update_one(collection, filter, update, upsert).await
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<bool, StoreError> {
        (**self).delete_one(collection, filter).await
    }
}
