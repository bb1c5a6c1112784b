//! `toyshelf-core`: shared building blocks for the catalog.
//!
//! This crate contains **pure** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{BlogId, ProductId, UserId};
