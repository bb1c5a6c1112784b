//! Document store boundary.
//!
//! The catalog talks to storage only through [`DocumentStore`], so the
//! backend is injected rather than held as process-wide state.

mod eval;
pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{Collection, DocumentStore, StoreError, UpdateOutcome};
