//! 1-based pagination.

use toyshelf_core::{DomainError, DomainResult};

/// A validated page request. `page` and `limit` are both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
    skip: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> DomainResult<Self> {
        if page < 1 {
            return Err(DomainError::invalid_argument("page must be >= 1"));
        }
        if limit < 1 {
            return Err(DomainError::invalid_argument("limit must be >= 1"));
        }
        let skip = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| DomainError::invalid_argument("page * limit is out of range"))?;
        Ok(Self { page, limit, skip })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// `(page - 1) * limit`
    pub fn skip(&self) -> u64 {
        self.skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_page_skips_nothing() {
        let page = PageRequest::new(1, 25).unwrap();
        assert_eq!(page.skip(), 0);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn zero_page_or_limit_is_invalid() {
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            PageRequest::new(3, 0),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn overflowing_skip_is_invalid() {
        assert!(PageRequest::new(u64::MAX, 2).is_err());
    }

    proptest! {
        /// Property: skip is always (page - 1) * limit for in-range inputs.
        #[test]
        fn skip_matches_formula(page in 1u64..100_000, limit in 1u64..1_000) {
            let req = PageRequest::new(page, limit).unwrap();
            prop_assert_eq!(req.skip(), (page - 1) * limit);
            prop_assert_eq!(req.page(), page);
        }
    }
}
