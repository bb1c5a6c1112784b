use serde::Deserialize;

use toyshelf_core::{DomainError, DomainResult, UserId};
use toyshelf_query::{ListingParams, RandomSampleParams, SearchParams, SortKey};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

// -------------------------
// Query-string DTOs
// -------------------------
//
// Fields stay strings so that malformed numbers produce the same JSON error
// body as every other validation failure.

#[derive(Debug, Default, Deserialize)]
pub struct RandomProductsQuery {
    pub quantity: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub seller_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProductsQuery {
    pub text: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub seller_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    /// Omitted: a fresh user id is minted.
    pub user_id: Option<String>,
}

fn parse_count(field: &str, raw: Option<&str>, default: Option<u64>) -> DomainResult<u64> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse().map_err(|_| {
            DomainError::invalid_argument(format!("{field} must be a positive integer"))
        }),
        None => default.ok_or_else(|| DomainError::invalid_argument(format!("{field} is required"))),
    }
}

impl RandomProductsQuery {
    pub fn into_params(self) -> DomainResult<RandomSampleParams> {
        Ok(RandomSampleParams {
            quantity: parse_count("quantity", self.quantity.as_deref(), None)?,
            category: self.category,
        })
    }
}

impl ListProductsQuery {
    pub fn into_params(self) -> DomainResult<ListingParams> {
        Ok(ListingParams {
            page: parse_count("page", self.page.as_deref(), Some(DEFAULT_PAGE))?,
            limit: parse_count("limit", self.limit.as_deref(), Some(DEFAULT_LIMIT))?,
            sort: SortKey::from_label(self.sort.as_deref())?,
            seller_id: self.seller_id,
        })
    }
}

impl SearchProductsQuery {
    pub fn into_params(self) -> DomainResult<SearchParams> {
        Ok(SearchParams {
            text: self.text.unwrap_or_default(),
            page: parse_count("page", self.page.as_deref(), Some(DEFAULT_PAGE))?,
            limit: parse_count("limit", self.limit.as_deref(), Some(DEFAULT_LIMIT))?,
            seller_id: self.seller_id,
        })
    }
}

impl CategoryQuery {
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }
}

impl TokenRequest {
    pub fn user_id(&self) -> DomainResult<UserId> {
        match self.user_id.as_deref() {
            Some(raw) => raw.parse(),
            None => Ok(UserId::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_defaults_and_sort_label() {
        let params = ListProductsQuery {
            sort: Some("Sort by price low to high".to_string()),
            ..Default::default()
        }
        .into_params()
        .unwrap();
        assert_eq!(params.page, DEFAULT_PAGE);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.sort, SortKey::PriceAscending);
    }

    #[test]
    fn unknown_sort_label_is_rejected() {
        let err = ListProductsQuery {
            sort: Some("cheapest".to_string()),
            ..Default::default()
        }
        .into_params()
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn quantity_is_required_and_numeric() {
        assert!(RandomProductsQuery::default().into_params().is_err());

        let err = RandomProductsQuery {
            quantity: Some("-3".to_string()),
            category: None,
        }
        .into_params()
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::invalid_argument("quantity must be a positive integer")
        );

        let params = RandomProductsQuery {
            quantity: Some(" 4 ".to_string()),
            category: Some("Toys".to_string()),
        }
        .into_params()
        .unwrap();
        assert_eq!(params.quantity, 4);
    }

    #[test]
    fn token_request_user_id() {
        assert!(TokenRequest::default().user_id().is_ok());
        let bad = TokenRequest {
            user_id: Some("nope".to_string()),
        };
        assert!(matches!(bad.user_id(), Err(DomainError::InvalidId(_))));
    }
}
