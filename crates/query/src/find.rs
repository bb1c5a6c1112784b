use serde_json::{Map, Value};

use crate::filter::Filter;
use crate::page::PageRequest;
use crate::stage::SortSpec;

/// A filter plus pagination/sort options for a direct lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindSpec {
    pub filter: Filter,
    pub skip: u64,
    /// `None` returns every match.
    pub limit: Option<u64>,
    pub sort: Option<SortSpec>,
}

impl FindSpec {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn paged(mut self, page: PageRequest) -> Self {
        self.skip = page.skip();
        self.limit = Some(page.limit());
        self
    }

    pub fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Driver options (`skip`, `limit`, `sort`), omitting unset ones.
    pub fn options_document(&self) -> Value {
        let mut doc = Map::new();
        if self.skip > 0 {
            doc.insert("skip".to_string(), Value::from(self.skip));
        }
        if let Some(limit) = self.limit {
            doc.insert("limit".to_string(), Value::from(limit));
        }
        if let Some(sort) = &self.sort {
            doc.insert("sort".to_string(), sort.to_document());
        }
        Value::Object(doc)
    }
}
