//! Typed per-operation parameters.
//!
//! HTTP query strings are decoded into these once at the boundary; from here
//! on nothing is stringly typed.

use toyshelf_core::DomainResult;

use crate::builder::{
    build_filter_sort_paginate_spec, build_random_sample_spec, build_search_spec,
};
use crate::find::FindSpec;
use crate::sort::SortKey;
use crate::stage::Pipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomSampleParams {
    pub quantity: u64,
    pub category: Option<String>,
}

impl RandomSampleParams {
    pub fn pipeline(&self) -> DomainResult<Pipeline> {
        build_random_sample_spec(self.quantity, self.category.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParams {
    pub page: u64,
    pub limit: u64,
    pub sort: SortKey,
    pub seller_id: Option<String>,
}

impl ListingParams {
    pub fn pipeline(&self) -> DomainResult<Pipeline> {
        build_filter_sort_paginate_spec(self.page, self.limit, self.sort, self.seller_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub text: String,
    pub page: u64,
    pub limit: u64,
    pub seller_id: Option<String>,
}

impl SearchParams {
    pub fn find_spec(&self) -> DomainResult<FindSpec> {
        build_search_spec(&self.text, self.limit, self.page, self.seller_id.as_deref())
    }
}
