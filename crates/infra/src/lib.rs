//! Infrastructure layer: document storage and the catalog service on top of it.

pub mod catalog;
pub mod seed;
pub mod store;

pub use catalog::{CatalogError, CatalogResult, CatalogService, CategoryRow, PinnedBlogs};
pub use seed::CatalogSeed;
pub use store::{Collection, DocumentStore, InMemoryDocumentStore, StoreError, UpdateOutcome};
