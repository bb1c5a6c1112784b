//! Catalog service: builds each query, runs it against the injected store,
//! and decodes typed results.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use toyshelf_core::{BlogId, DomainError, ProductId, UserId};
use toyshelf_products::{
    Blog, NewProduct, Product, ProductPatch, ProductSummary, UserBlogPin, fields,
};
use toyshelf_query::{
    Filter, FindSpec, ListingParams, PinAction, RandomSampleParams, SearchParams,
    build_category_filter_spec, build_category_group_spec, build_duplicate_product_filter,
    build_pin_update, build_product_lookup, build_subcategory_spec, build_update_document,
};

use crate::store::{Collection, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("failed to decode {collection} document: {message}")]
    Decode {
        collection: Collection,
        message: String,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// One row of the category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub category: String,
}

/// A user's pinned blog ids and the blogs that still exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinnedBlogs {
    pub blog_ids: Vec<BlogId>,
    pub blogs: Vec<Blog>,
}

fn decode<T: DeserializeOwned>(collection: Collection, doc: Value) -> CatalogResult<T> {
    serde_json::from_value(doc).map_err(|e| CatalogError::Decode {
        collection,
        message: e.to_string(),
    })
}

fn decode_all<T: DeserializeOwned>(collection: Collection, docs: Vec<Value>) -> CatalogResult<Vec<T>> {
    docs.into_iter().map(|doc| decode(collection, doc)).collect()
}

fn by_id(id: String) -> Filter {
    Filter::new().eq(fields::ID, id)
}

pub struct CatalogService<S> {
    store: S,
}

impl<S> CatalogService<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn product(&self, id: ProductId) -> CatalogResult<Product> {
        tracing::debug!(product_id = %id, "loading product");
        let doc = self
            .store
            .find_one(Collection::Products, &build_product_lookup(id))
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;
        decode(Collection::Products, doc)
    }

    pub async fn random_products(
        &self,
        params: &RandomSampleParams,
    ) -> CatalogResult<Vec<ProductSummary>> {
        tracing::debug!(quantity = params.quantity, category = ?params.category, "sampling products");
        let pipeline = params.pipeline()?;
        let docs = self.store.aggregate(Collection::Products, &pipeline).await?;
        decode_all(Collection::Products, docs)
    }

    pub async fn products_page(&self, params: &ListingParams) -> CatalogResult<Vec<Product>> {
        tracing::debug!(
            page = params.page,
            limit = params.limit,
            sort = params.sort.label(),
            "listing products"
        );
        let pipeline = params.pipeline()?;
        let docs = self.store.aggregate(Collection::Products, &pipeline).await?;
        decode_all(Collection::Products, docs)
    }

    pub async fn search_products(&self, params: &SearchParams) -> CatalogResult<Vec<Product>> {
        tracing::debug!(text = %params.text, page = params.page, "searching products");
        let spec = params.find_spec()?;
        let docs = self.store.find(Collection::Products, &spec).await?;
        decode_all(Collection::Products, docs)
    }

    pub async fn products_by_category(&self, category: &str) -> CatalogResult<Vec<Product>> {
        let spec = build_category_filter_spec(category)?;
        let docs = self.store.find(Collection::Products, &spec).await?;
        decode_all(Collection::Products, docs)
    }

    /// Products without a category group under a null key; that row is
    /// dropped.
    pub async fn categories(&self) -> CatalogResult<Vec<CategoryRow>> {
        let docs = self
            .store
            .aggregate(Collection::Products, &build_category_group_spec())
            .await?;
        let docs = docs
            .into_iter()
            .filter(|doc| !doc.get(fields::ID).is_none_or(Value::is_null))
            .collect();
        decode_all(Collection::Products, docs)
    }

    /// Sorted distinct subcategories of `category`. Empty when nothing matches.
    pub async fn subcategories(&self, category: &str) -> CatalogResult<Vec<String>> {
        let category = category.trim();
        if category.is_empty() {
            return Err(DomainError::invalid_argument("category cannot be empty").into());
        }
        let rows = self
            .store
            .aggregate(Collection::Products, &build_subcategory_spec(category))
            .await?;

        match rows
            .into_iter()
            .next()
            .and_then(|mut row| row.get_mut(fields::SUB_CATEGORIES).map(Value::take))
        {
            Some(list) => decode(Collection::Products, list),
            None => Ok(Vec::new()),
        }
    }

    pub async fn create_product(&self, new_product: NewProduct) -> CatalogResult<Product> {
        let product = new_product.into_product(ProductId::new())?;
        let doc = serde_json::to_value(&product).map_err(|e| CatalogError::Decode {
            collection: Collection::Products,
            message: e.to_string(),
        })?;
        let unique = build_duplicate_product_filter(&product.title, &product.seller.id);

        match self
            .store
            .insert_one(Collection::Products, doc, Some(&unique))
            .await
        {
            Ok(()) => {
                tracing::info!(product_id = %product.id, seller_id = %product.seller.id, "product created");
                Ok(product)
            }
            Err(StoreError::Duplicate { .. }) => {
                tracing::warn!(title = %product.title, seller_id = %product.seller.id, "duplicate product rejected");
                Err(DomainError::conflict(format!(
                    "product '{}' already exists for seller '{}'",
                    product.title, product.seller.id
                ))
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial update and return the stored result.
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> CatalogResult<Product> {
        let update = build_update_document(patch)?;
        let lookup = build_product_lookup(id);
        let outcome = self
            .store
            .update_one(Collection::Products, &lookup, &update, false)
            .await?;
        if !outcome.matched {
            return Err(CatalogError::NotFound(format!("product {id}")));
        }
        tracing::info!(product_id = %id, modified = outcome.modified, "product updated");
        self.product(id).await
    }

    pub async fn delete_product(&self, id: ProductId) -> CatalogResult<()> {
        let removed = self
            .store
            .delete_one(Collection::Products, &build_product_lookup(id))
            .await?;
        if !removed {
            return Err(CatalogError::NotFound(format!("product {id}")));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn blogs(&self) -> CatalogResult<Vec<Blog>> {
        let docs = self
            .store
            .find(Collection::Blogs, &FindSpec::default())
            .await?;
        decode_all(Collection::Blogs, docs)
    }

    pub async fn blog(&self, id: BlogId) -> CatalogResult<Blog> {
        let doc = self
            .store
            .find_one(Collection::Blogs, &by_id(id.to_document_id()))
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("blog {id}")))?;
        decode(Collection::Blogs, doc)
    }

    async fn pin_document(&self, user: UserId) -> CatalogResult<UserBlogPin> {
        match self
            .store
            .find_one(Collection::UserBlogPins, &by_id(user.to_document_id()))
            .await?
        {
            Some(doc) => decode(Collection::UserBlogPins, doc),
            None => Ok(UserBlogPin::empty(user)),
        }
    }

    /// Blogs pinned by `user`. Pins whose blog has since disappeared are
    /// listed in `blog_ids` but skipped in `blogs`.
    pub async fn pinned_blogs(&self, user: UserId) -> CatalogResult<PinnedBlogs> {
        tracing::debug!(user_id = %user, "loading pinned blogs");
        let pins = self.pin_document(user).await?;

        let mut blogs = Vec::with_capacity(pins.blogs.len());
        for blog_id in &pins.blogs {
            match self.blog(*blog_id).await {
                Ok(blog) => blogs.push(blog),
                Err(CatalogError::NotFound(_)) => {
                    tracing::debug!(user_id = %user, blog_id = %blog_id, "pinned blog no longer exists");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(PinnedBlogs {
            blog_ids: pins.blogs,
            blogs,
        })
    }

    /// Pin a blog. Pinning twice is a no-op. The blog must exist.
    pub async fn pin_blog(&self, user: UserId, blog_id: BlogId) -> CatalogResult<UserBlogPin> {
        self.blog(blog_id).await?;
        self.apply_pin(user, blog_id, PinAction::Pin).await
    }

    /// Unpin a blog. Unpinning something that is not pinned is a no-op.
    pub async fn unpin_blog(&self, user: UserId, blog_id: BlogId) -> CatalogResult<UserBlogPin> {
        self.apply_pin(user, blog_id, PinAction::Unpin).await
    }

    async fn apply_pin(
        &self,
        user: UserId,
        blog_id: BlogId,
        action: PinAction,
    ) -> CatalogResult<UserBlogPin> {
        let update = build_pin_update(blog_id, action);
        let outcome = self
            .store
            .update_one(
                Collection::UserBlogPins,
                &by_id(user.to_document_id()),
                &update,
                action == PinAction::Pin,
            )
            .await?;
        tracing::info!(
            user_id = %user,
            blog_id = %blog_id,
            action = ?action,
            changed = outcome.modified || outcome.upserted,
            "blog pins updated"
        );
        self.pin_document(user).await
    }
}
