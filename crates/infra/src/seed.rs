//! Startup data for the in-memory store.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use toyshelf_products::{Blog, Product};
use toyshelf_query::build_duplicate_product_filter;

use crate::store::{Collection, DocumentStore};

/// Contents of a seed file: `{ "products": [...], "blogs": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub blogs: Vec<Blog>,
}

impl CatalogSeed {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("seed file is not a valid catalog document")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("while loading {}", path.display()))
    }

    /// Insert every seeded document. Products are validated and held to the
    /// `(title, seller.id)` uniqueness rule. Fails on the first bad or
    /// duplicate document.
    pub async fn apply<S: DocumentStore>(&self, store: &S) -> anyhow::Result<()> {
        for product in &self.products {
            product
                .validate()
                .with_context(|| format!("invalid seed product {}", product.id))?;
            let doc = serde_json::to_value(product)?;
            let unique = build_duplicate_product_filter(&product.title, &product.seller.id);
            store
                .insert_one(Collection::Products, doc, Some(&unique))
                .await
                .with_context(|| format!("seeding product {}", product.id))?;
        }
        for blog in &self.blogs {
            let doc = serde_json::to_value(blog)?;
            store
                .insert_one(Collection::Blogs, doc, None)
                .await
                .with_context(|| format!("seeding blog {}", blog.id))?;
        }
        tracing::info!(
            products = self.products.len(),
            blogs = self.blogs.len(),
            "catalog seeded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;

    const SEED: &str = r#"{
        "products": [{
            "_id": "0190a6c4-0000-7000-8000-000000000001",
            "title": "Kite",
            "thumbnailImage": "kite.png",
            "description": "",
            "seller": { "id": "s1" },
            "price": 10,
            "listPrice": 12,
            "brand": "Acme",
            "category": "Toys",
            "subCategory": "Outdoor",
            "quantity": 3,
            "inStock": true,
            "reviewsCount": 4,
            "stars": 4.5
        }],
        "blogs": [{ "_id": "0190a6c4-0000-7000-8000-0000000000b1", "title": "Hello" }]
    }"#;

    #[tokio::test]
    async fn seed_populates_collections() {
        let store = InMemoryDocumentStore::new();
        let seed = CatalogSeed::from_json(SEED).unwrap();
        seed.apply(&store).await.unwrap();
        assert_eq!(store.count(Collection::Products).unwrap(), 1);
        assert_eq!(store.count(Collection::Blogs).unwrap(), 1);

        let err = seed.apply(&store).await.unwrap_err();
        assert!(format!("{err:#}").contains("duplicate"));
    }

    #[tokio::test]
    async fn duplicate_title_and_seller_is_rejected() {
        let store = InMemoryDocumentStore::new();
        let seed = CatalogSeed::from_json(
            r#"{ "products": [
                { "_id": "0190a6c4-0000-7000-8000-000000000001", "title": "Kite", "seller": { "id": "s1" } },
                { "_id": "0190a6c4-0000-7000-8000-000000000002", "title": "Kite", "seller": { "id": "s1" } }
            ] }"#,
        )
        .unwrap();

        let err = seed.apply(&store).await.unwrap_err();
        assert!(format!("{err:#}").contains("duplicate"));
        assert_eq!(store.count(Collection::Products).unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_product_is_rejected() {
        let store = InMemoryDocumentStore::new();
        let seed = CatalogSeed::from_json(
            r#"{ "products": [
                { "_id": "0190a6c4-0000-7000-8000-000000000003", "title": "Kite", "seller": { "id": "s1" }, "stars": 7 }
            ] }"#,
        )
        .unwrap();

        let err = seed.apply(&store).await.unwrap_err();
        assert!(format!("{err:#}").contains("stars"));
        assert_eq!(store.count(Collection::Products).unwrap(), 0);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let seed = CatalogSeed::from_json("{}").unwrap();
        assert!(seed.products.is_empty() && seed.blogs.is_empty());
        assert!(CatalogSeed::from_json("[]").is_err());
    }
}
