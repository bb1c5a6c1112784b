//! `toyshelf-query`: query and aggregation-pipeline construction.
//!
//! Turns typed request parameters into either a find-spec (filter plus
//! skip/limit/sort) or an ordered aggregation pipeline. Everything here is a
//! pure function of its inputs: no IO, no shared state, and identical inputs
//! always produce structurally identical output.
//!
//! Values are typed ([`Filter`], [`Stage`], [`Pipeline`], [`FindSpec`],
//! [`UpdateSpec`]) and render to the document store's wire shape through
//! `to_document()` or `serde::Serialize`.

pub mod builder;
pub mod filter;
pub mod find;
pub mod page;
pub mod params;
pub mod sort;
pub mod stage;
pub mod update;

pub use builder::{
    PinAction, build_category_filter_spec, build_category_group_spec,
    build_duplicate_product_filter, build_filter_sort_paginate_spec, build_pin_update,
    build_product_lookup, build_random_sample_spec, build_search_spec, build_subcategory_spec,
    build_update_document,
};
pub use filter::{Condition, Filter, Predicate};
pub use find::FindSpec;
pub use page::PageRequest;
pub use params::{ListingParams, RandomSampleParams, SearchParams};
pub use sort::SortKey;
pub use stage::{
    Accumulator, Group, GroupKey, Pipeline, ProjectField, Projection, SortDirection, SortSpec,
    Stage,
};
pub use update::UpdateSpec;
