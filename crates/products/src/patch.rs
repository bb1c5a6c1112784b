//! Partial product update payload.
//!
//! Every field is optional. Form clients tend to send numbers as strings and
//! blank inputs as `""`, so numeric fields accept either shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use toyshelf_core::{DomainError, DomainResult};

use crate::product::{MAX_STARS, Seller, ensure_non_negative};

/// A numeric field as received from a client: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Coerce to `f64`.
    ///
    /// Returns `Ok(None)` for blank text (the field is treated as absent, not
    /// as zero).
    pub fn coerce(&self, field: &str) -> DomainResult<Option<f64>> {
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<f64>().map_err(|_| {
                    DomainError::invalid_argument(format!("{field} must be numeric, got {s:?}"))
                })?
            }
        };
        ensure_non_negative(field, value)?;
        Ok(Some(value))
    }

    /// Coerce a star rating, bounded to `0..=MAX_STARS`.
    pub fn coerce_stars(&self, field: &str) -> DomainResult<Option<f64>> {
        let stars = self.coerce(field)?;
        if stars.is_some_and(|s| s > MAX_STARS) {
            return Err(DomainError::invalid_argument(format!(
                "{field} must be between 0 and {MAX_STARS}"
            )));
        }
        Ok(stars)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<NumericInput>,
    #[serde(default)]
    pub list_price: Option<NumericInput>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub quantity: Option<NumericInput>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub reviews_count: Option<u64>,
    #[serde(default)]
    pub stars: Option<NumericInput>,
    #[serde(default)]
    pub seller: Option<Seller>,
}

/// A string field worth writing: present and not blank.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn blank_text_is_absent_not_zero() {
        assert_eq!(NumericInput::from("").coerce("price").unwrap(), None);
        assert_eq!(NumericInput::from("   ").coerce("price").unwrap(), None);
    }

    #[test]
    fn numeric_text_is_parsed() {
        assert_eq!(NumericInput::from(" 12.5 ").coerce("price").unwrap(), Some(12.5));
        assert_eq!(NumericInput::from(3.0).coerce("quantity").unwrap(), Some(3.0));
    }

    #[test]
    fn garbage_and_negative_are_rejected() {
        match NumericInput::from("cheap").coerce("price").unwrap_err() {
            DomainError::InvalidArgument(msg) => assert!(msg.contains("price")),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
        assert!(NumericInput::from(-2.0).coerce("price").is_err());
    }

    #[test]
    fn patch_decodes_mixed_numeric_shapes() {
        let patch: ProductPatch = serde_json::from_value(json!({
            "title": "X",
            "price": "",
            "listPrice": 20,
            "quantity": "4",
            "subCategory": null
        }))
        .unwrap();

        assert_eq!(patch.title.as_deref(), Some("X"));
        assert_eq!(patch.price, Some(NumericInput::Text(String::new())));
        assert_eq!(patch.list_price, Some(NumericInput::Number(20.0)));
        assert_eq!(patch.quantity, Some(NumericInput::Text("4".to_string())));
        assert_eq!(patch.sub_category, None);
    }

    #[test]
    fn stars_are_bounded() {
        assert_eq!(NumericInput::from("4.5").coerce_stars("stars").unwrap(), Some(4.5));
        assert_eq!(NumericInput::from(5.0).coerce_stars("stars").unwrap(), Some(5.0));
        assert!(NumericInput::from(7.0).coerce_stars("stars").is_err());
        assert!(NumericInput::from(-1.0).coerce_stars("stars").is_err());
    }

    #[test]
    fn patch_decodes_rating_and_seller() {
        let patch: ProductPatch = serde_json::from_value(json!({
            "stars": 4.5,
            "reviewsCount": 3,
            "seller": { "id": "s-2", "name": "Tim" }
        }))
        .unwrap();

        assert_eq!(patch.stars, Some(NumericInput::Number(4.5)));
        assert_eq!(patch.reviews_count, Some(3));
        assert_eq!(patch.seller.map(|s| s.id).as_deref(), Some("s-2"));
    }

    #[test]
    fn non_blank_filters_whitespace() {
        assert_eq!(non_blank(&Some(" a ".to_string())), Some("a"));
        assert_eq!(non_blank(&Some("  ".to_string())), None);
        assert_eq!(non_blank(&None), None);
    }

    proptest! {
        /// Property: any non-negative number written as text coerces back to itself.
        #[test]
        fn text_coercion_matches_number(n in 0.0f64..1.0e9) {
            let text = NumericInput::Text(n.to_string());
            prop_assert_eq!(text.coerce("price").unwrap(), Some(n));
        }
    }
}
