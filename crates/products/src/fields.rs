//! Stored field names (dotted paths for nested fields).

pub const ID: &str = "_id";
pub const TITLE: &str = "title";
pub const THUMBNAIL_IMAGE: &str = "thumbnailImage";
pub const DESCRIPTION: &str = "description";
pub const SELLER_ID: &str = "seller.id";
pub const SELLER_NAME: &str = "seller.name";
pub const PRICE: &str = "price";
pub const LIST_PRICE: &str = "listPrice";
pub const FEATURES: &str = "features";
pub const ATTRIBUTES: &str = "attributes";
pub const BRAND: &str = "brand";
pub const CATEGORY: &str = "category";
pub const SUB_CATEGORY: &str = "subCategory";
pub const QUANTITY: &str = "quantity";
pub const IN_STOCK: &str = "inStock";
pub const REVIEWS_COUNT: &str = "reviewsCount";
pub const STARS: &str = "stars";

/// Array of pinned blog ids on a `UserBlogPin` document.
pub const PINNED_BLOGS: &str = "blogs";

/// Output field of the subcategory pipeline.
pub const SUB_CATEGORIES: &str = "subCategories";
