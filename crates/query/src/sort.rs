//! Listing sort options.
//!
//! The storefront sends human-readable labels; they are decoded into
//! [`SortKey`] once at the boundary and never travel further.

use core::str::FromStr;

use toyshelf_core::{DomainError, DomainResult};
use toyshelf_products::fields;

use crate::stage::{SortDirection, SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Unsorted,
    NameAscending,
    NameDescending,
    PriceDescending,
    PriceAscending,
    /// Highest rated first; unrated products are excluded.
    Popularity,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Unsorted,
        SortKey::NameAscending,
        SortKey::NameDescending,
        SortKey::PriceDescending,
        SortKey::PriceAscending,
        SortKey::Popularity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Unsorted => "Default",
            SortKey::NameAscending => "Sort by name A-Z",
            SortKey::NameDescending => "Sort by name Z-A",
            SortKey::PriceDescending => "Sort by price high to low",
            SortKey::PriceAscending => "Sort by price low to high",
            SortKey::Popularity => "Sort by popularity",
        }
    }

    /// Decode an optional UI label. Absent, blank and `Default` mean no sort.
    pub fn from_label(label: Option<&str>) -> DomainResult<Self> {
        match label.map(str::trim) {
            None | Some("") => Ok(SortKey::Unsorted),
            Some(s) => s.parse(),
        }
    }

    pub fn sort_spec(self) -> Option<SortSpec> {
        let (field, direction) = match self {
            SortKey::Unsorted => return None,
            SortKey::NameAscending => (fields::TITLE, SortDirection::Ascending),
            SortKey::NameDescending => (fields::TITLE, SortDirection::Descending),
            SortKey::PriceDescending => (fields::PRICE, SortDirection::Descending),
            SortKey::PriceAscending => (fields::PRICE, SortDirection::Ascending),
            SortKey::Popularity => (fields::STARS, SortDirection::Descending),
        };
        Some(SortSpec::by(field, direction))
    }

    /// Whether documents without a rating must be filtered out first.
    pub fn requires_rating(self) -> bool {
        matches!(self, SortKey::Popularity)
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.label() == s)
            .ok_or_else(|| DomainError::invalid_argument(format!("unknown sort option: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for key in SortKey::ALL {
            assert_eq!(key.label().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn absent_or_blank_label_means_unsorted() {
        assert_eq!(SortKey::from_label(None).unwrap(), SortKey::Unsorted);
        assert_eq!(SortKey::from_label(Some("  ")).unwrap(), SortKey::Unsorted);
        assert_eq!(SortKey::from_label(Some("Default")).unwrap(), SortKey::Unsorted);
        assert_eq!(SortKey::Unsorted.sort_spec(), None);
    }

    #[test]
    fn unknown_label_is_invalid() {
        assert!(matches!(
            SortKey::from_label(Some("Sort by colour")),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn popularity_sorts_by_stars_descending() {
        let spec = SortKey::Popularity.sort_spec().unwrap();
        assert_eq!(spec.keys(), &[("stars".to_string(), SortDirection::Descending)]);
        assert!(SortKey::Popularity.requires_rating());
        assert!(!SortKey::PriceAscending.requires_rating());
    }
}
