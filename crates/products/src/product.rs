use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use toyshelf_core::{DomainError, DomainResult, ProductId};

/// Highest star rating a product can carry.
pub const MAX_STARS: f64 = 5.0;

/// Seller reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A stored product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub thumbnail_image: String,
    #[serde(default)]
    pub description: String,
    pub seller: Seller,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub list_price: f64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub reviews_count: u64,
    /// Absent for products that were never rated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<f64>,
}

/// Projection returned by the random-sample pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub thumbnail_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Insert payload for a product (the store assigns nothing; the id is
/// minted by the caller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub thumbnail_image: String,
    #[serde(default)]
    pub description: String,
    pub seller: Seller,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub list_price: f64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub reviews_count: u64,
    #[serde(default)]
    pub stars: Option<f64>,
}

impl Product {
    /// Same rules as [`NewProduct::validate`], for documents that arrive with
    /// an id already attached (seed files).
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&ProductFields {
            title: &self.title,
            seller_id: &self.seller.id,
            price: self.price,
            list_price: self.list_price,
            quantity: self.quantity,
            stars: self.stars,
        })
    }
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&ProductFields {
            title: &self.title,
            seller_id: &self.seller.id,
            price: self.price,
            list_price: self.list_price,
            quantity: self.quantity,
            stars: self.stars,
        })
    }

    /// Validate and attach an identifier.
    pub fn into_product(self, id: ProductId) -> DomainResult<Product> {
        self.validate()?;
        Ok(Product {
            id,
            title: self.title.trim().to_string(),
            thumbnail_image: self.thumbnail_image,
            description: self.description,
            seller: Seller {
                id: self.seller.id.trim().to_string(),
                name: self.seller.name,
            },
            price: self.price,
            list_price: self.list_price,
            features: self.features,
            attributes: self.attributes,
            brand: self.brand,
            category: trimmed(self.category),
            sub_category: trimmed(self.sub_category),
            quantity: self.quantity,
            in_stock: self.in_stock,
            reviews_count: self.reviews_count,
            stars: self.stars,
        })
    }
}

struct ProductFields<'a> {
    title: &'a str,
    seller_id: &'a str,
    price: f64,
    list_price: f64,
    quantity: f64,
    stars: Option<f64>,
}

fn validate_fields(p: &ProductFields<'_>) -> DomainResult<()> {
    if p.title.trim().is_empty() {
        return Err(DomainError::invalid_argument("title cannot be empty"));
    }
    if p.seller_id.trim().is_empty() {
        return Err(DomainError::invalid_argument("seller id cannot be empty"));
    }
    ensure_non_negative("price", p.price)?;
    ensure_non_negative("listPrice", p.list_price)?;
    ensure_non_negative("quantity", p.quantity)?;
    if let Some(stars) = p.stars {
        if !stars.is_finite() || !(0.0..=MAX_STARS).contains(&stars) {
            return Err(DomainError::invalid_argument(format!(
                "stars must be between 0 and {MAX_STARS}"
            )));
        }
    }
    Ok(())
}

/// Blank text is stored as an absent field.
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn ensure_non_negative(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::invalid_argument(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}
