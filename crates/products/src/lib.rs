//! Catalog data model.
//!
//! This crate contains the document shapes for products, blogs and per-user
//! blog pins, plus the validation rules applied before anything reaches the
//! store (no IO, no HTTP, no storage).

pub mod blog;
pub mod fields;
pub mod patch;
pub mod product;

pub use blog::{Blog, UserBlogPin};
pub use patch::{NumericInput, ProductPatch};
pub use product::{NewProduct, Product, ProductSummary, Seller};
