//! Catalog query construction.
//!
//! One function per catalog read/write shape. Each either returns a complete
//! query value or fails with `InvalidArgument` before anything is built.

use serde_json::{Map, Value};

use toyshelf_core::{BlogId, DomainError, DomainResult, ProductId};
use toyshelf_products::{ProductPatch, fields, patch::non_blank};

use crate::filter::Filter;
use crate::find::FindSpec;
use crate::page::PageRequest;
use crate::sort::SortKey;
use crate::stage::{
    Accumulator, Group, GroupKey, Pipeline, Projection, SortDirection, SortSpec, Stage,
};
use crate::update::UpdateSpec;

/// Blank optional strings are treated as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// In-stock products (optionally in one category), `quantity` picked at
/// random, projected to id/title/thumbnail/category.
///
/// If fewer than `quantity` documents match, the store returns all of them.
pub fn build_random_sample_spec(quantity: u64, category: Option<&str>) -> DomainResult<Pipeline> {
    if quantity < 1 {
        return Err(DomainError::invalid_argument("quantity must be >= 1"));
    }

    let mut filter = Filter::new().eq(fields::IN_STOCK, true);
    if let Some(category) = present(category) {
        filter = filter.eq(fields::CATEGORY, category);
    }

    Ok(Pipeline::new()
        .then(Stage::Match(filter))
        .then(Stage::Sample { size: quantity })
        .then(Stage::Project(
            Projection::new()
                .include(fields::ID)
                .include(fields::TITLE)
                .include(fields::THUMBNAIL_IMAGE)
                .include(fields::CATEGORY),
        )))
}

/// Paged product listing.
///
/// Stage order: seller filter, rating pre-filter (popularity only), sort,
/// skip, limit. Skip and limit are always present and always last. Equal sort
/// keys keep the store's natural order.
pub fn build_filter_sort_paginate_spec(
    page: u64,
    limit: u64,
    sort_key: SortKey,
    seller_id: Option<&str>,
) -> DomainResult<Pipeline> {
    let page = PageRequest::new(page, limit)?;
    let mut pipeline = Pipeline::new();

    if let Some(seller_id) = present(seller_id) {
        pipeline.push(Stage::Match(Filter::new().eq(fields::SELLER_ID, seller_id)));
    }
    if sort_key.requires_rating() {
        pipeline.push(Stage::Match(Filter::new().ne(fields::STARS, Value::Null)));
    }
    if let Some(sort) = sort_key.sort_spec() {
        pipeline.push(Stage::Sort(sort));
    }
    pipeline.push(Stage::Skip(page.skip()));
    pipeline.push(Stage::Limit(page.limit()));

    Ok(pipeline)
}

/// One row per distinct category, ascending, shaped `{_id, category}`.
pub fn build_category_group_spec() -> Pipeline {
    Pipeline::new()
        .then(Stage::Group(Group::by(GroupKey::Field(
            fields::CATEGORY.to_string(),
        ))))
        .then(Stage::Sort(SortSpec::by(fields::ID, SortDirection::Ascending)))
        .then(Stage::Project(
            Projection::new()
                .include(fields::ID)
                .field_ref(fields::CATEGORY, fields::ID),
        ))
}

/// Distinct subcategories of `category`, sorted ascending, folded into a
/// single `{subCategories: [...]}` row.
///
/// Produces no rows when nothing matches; callers treat that as an empty
/// list.
pub fn build_subcategory_spec(category: &str) -> Pipeline {
    let collect_distinct = Group::by(GroupKey::Null).accumulate(
        fields::SUB_CATEGORIES,
        Accumulator::AddToSet(fields::SUB_CATEGORY.to_string()),
    );
    let collect_sorted = Group::by(GroupKey::Null).accumulate(
        fields::SUB_CATEGORIES,
        Accumulator::Push(fields::SUB_CATEGORIES.to_string()),
    );
    let only_list = || {
        Projection::new()
            .exclude(fields::ID)
            .include(fields::SUB_CATEGORIES)
    };

    Pipeline::new()
        .then(Stage::Match(Filter::new().eq(fields::CATEGORY, category)))
        .then(Stage::Group(collect_distinct))
        .then(Stage::Project(only_list()))
        .then(Stage::Unwind(fields::SUB_CATEGORIES.to_string()))
        .then(Stage::Sort(SortSpec::by(
            fields::SUB_CATEGORIES,
            SortDirection::Ascending,
        )))
        .then(Stage::Group(collect_sorted))
        .then(Stage::Project(only_list()))
}

/// Case-insensitive title search, optionally within one seller's products.
pub fn build_search_spec(
    text: &str,
    limit: u64,
    page: u64,
    seller_id: Option<&str>,
) -> DomainResult<FindSpec> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::invalid_argument("search text cannot be empty"));
    }
    let page = PageRequest::new(page, limit)?;

    let mut filter = Filter::new().contains(fields::TITLE, text, true);
    if let Some(seller_id) = present(seller_id) {
        filter = filter.eq(fields::SELLER_ID, seller_id);
    }

    Ok(FindSpec::new(filter).paged(page))
}

/// `$set` of the fields actually supplied in `patch`.
///
/// Blank strings, empty lists/maps and blank numeric text are skipped;
/// `price`, `listPrice`, `quantity` and `stars` are written as floating point.
/// A seller is written field by field so an omitted name is kept.
pub fn build_update_document(patch: &ProductPatch) -> DomainResult<UpdateSpec> {
    let mut update = UpdateSpec::new();

    let text_fields = [
        (fields::TITLE, &patch.title),
        (fields::THUMBNAIL_IMAGE, &patch.thumbnail_image),
        (fields::DESCRIPTION, &patch.description),
        (fields::BRAND, &patch.brand),
        (fields::CATEGORY, &patch.category),
        (fields::SUB_CATEGORY, &patch.sub_category),
    ];
    for (field, value) in text_fields {
        if let Some(value) = non_blank(value) {
            update = update.set(field, value);
        }
    }

    let numeric_fields = [
        (fields::PRICE, &patch.price),
        (fields::LIST_PRICE, &patch.list_price),
        (fields::QUANTITY, &patch.quantity),
    ];
    for (field, value) in numeric_fields {
        if let Some(input) = value {
            if let Some(n) = input.coerce(field)? {
                update = update.set(field, n);
            }
        }
    }

    if let Some(features) = patch.features.as_ref().filter(|f| !f.is_empty()) {
        update = update.set(fields::FEATURES, features.clone());
    }
    if let Some(attributes) = patch.attributes.as_ref().filter(|a| !a.is_empty()) {
        let attributes = attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Map<_, _>>();
        update = update.set(fields::ATTRIBUTES, Value::Object(attributes));
    }
    if let Some(in_stock) = patch.in_stock {
        update = update.set(fields::IN_STOCK, in_stock);
    }
    if let Some(reviews_count) = patch.reviews_count {
        update = update.set(fields::REVIEWS_COUNT, reviews_count);
    }
    if let Some(stars) = &patch.stars {
        if let Some(stars) = stars.coerce_stars(fields::STARS)? {
            update = update.set(fields::STARS, stars);
        }
    }
    if let Some(seller) = &patch.seller {
        if let Some(id) = present(Some(&seller.id)) {
            update = update.set(fields::SELLER_ID, id);
        }
        if let Some(name) = non_blank(&seller.name) {
            update = update.set(fields::SELLER_NAME, name);
        }
    }

    if update.is_empty() {
        return Err(DomainError::invalid_argument("no fields to update"));
    }
    Ok(update)
}

/// `{_id: id}`
pub fn build_product_lookup(id: ProductId) -> Filter {
    Filter::new().eq(fields::ID, id.to_document_id())
}

/// Every product in `category`, unpaged.
pub fn build_category_filter_spec(category: &str) -> DomainResult<FindSpec> {
    let category = present(Some(category))
        .ok_or_else(|| DomainError::invalid_argument("category cannot be empty"))?;
    Ok(FindSpec::new(Filter::new().eq(fields::CATEGORY, category)))
}

/// Uniqueness key for product inserts: `(title, seller.id)`.
pub fn build_duplicate_product_filter(title: &str, seller_id: &str) -> Filter {
    Filter::new()
        .eq(fields::TITLE, title)
        .eq(fields::SELLER_ID, seller_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    Pin,
    Unpin,
}

/// Add or remove one blog id on a user's pin document. Pinning is meant to
/// be applied as an upsert.
pub fn build_pin_update(blog_id: BlogId, action: PinAction) -> UpdateSpec {
    let id = blog_id.to_document_id();
    match action {
        PinAction::Pin => UpdateSpec::new().add_to_set(fields::PINNED_BLOGS, id),
        PinAction::Unpin => UpdateSpec::new().pull(fields::PINNED_BLOGS, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use toyshelf_products::NumericInput;

    #[test]
    fn random_sample_matches_in_stock_samples_and_projects() {
        let pipeline = build_random_sample_spec(4, None).unwrap();
        assert_eq!(
            pipeline.to_documents(),
            vec![
                json!({ "$match": { "inStock": true } }),
                json!({ "$sample": { "size": 4 } }),
                json!({ "$project": { "_id": 1, "title": 1, "thumbnailImage": 1, "category": 1 } }),
            ]
        );
    }

    #[test]
    fn random_sample_adds_category_when_given() {
        let pipeline = build_random_sample_spec(2, Some("Puzzles")).unwrap();
        assert_eq!(
            pipeline.to_documents()[0],
            json!({ "$match": { "inStock": true, "category": "Puzzles" } })
        );

        let blank = build_random_sample_spec(2, Some("  ")).unwrap();
        assert_eq!(blank.to_documents()[0], json!({ "$match": { "inStock": true } }));
    }

    #[test]
    fn random_sample_rejects_zero_quantity() {
        assert!(matches!(
            build_random_sample_spec(0, None),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn name_sort_second_page() {
        let pipeline = build_filter_sort_paginate_spec(2, 10, SortKey::NameAscending, None).unwrap();
        assert_eq!(
            pipeline.to_documents(),
            vec![
                json!({ "$sort": { "title": 1 } }),
                json!({ "$skip": 10 }),
                json!({ "$limit": 10 }),
            ]
        );
    }

    #[test]
    fn popularity_sort_prefilters_unrated() {
        let pipeline = build_filter_sort_paginate_spec(1, 5, SortKey::Popularity, None).unwrap();
        assert_eq!(
            pipeline.to_documents(),
            vec![
                json!({ "$match": { "stars": { "$ne": null } } }),
                json!({ "$sort": { "stars": -1 } }),
                json!({ "$skip": 0 }),
                json!({ "$limit": 5 }),
            ]
        );
    }

    #[test]
    fn seller_filter_comes_first() {
        let pipeline =
            build_filter_sort_paginate_spec(1, 5, SortKey::Popularity, Some("s-1")).unwrap();
        assert_eq!(
            pipeline.stage_names(),
            vec!["$match", "$match", "$sort", "$skip", "$limit"]
        );
        assert_eq!(
            pipeline.to_documents()[0],
            json!({ "$match": { "seller.id": "s-1" } })
        );
    }

    #[test]
    fn unsorted_listing_still_paginates() {
        let pipeline = build_filter_sort_paginate_spec(3, 7, SortKey::Unsorted, None).unwrap();
        assert_eq!(
            pipeline.to_documents(),
            vec![json!({ "$skip": 14 }), json!({ "$limit": 7 })]
        );
    }

    #[test]
    fn listing_rejects_bad_paging() {
        assert!(build_filter_sort_paginate_spec(0, 10, SortKey::Unsorted, None).is_err());
        assert!(build_filter_sort_paginate_spec(1, 0, SortKey::Unsorted, None).is_err());
    }

    #[test]
    fn category_group_shape() {
        assert_eq!(
            build_category_group_spec().to_documents(),
            vec![
                json!({ "$group": { "_id": "$category" } }),
                json!({ "$sort": { "_id": 1 } }),
                json!({ "$project": { "_id": 1, "category": "$_id" } }),
            ]
        );
    }

    #[test]
    fn subcategory_shape() {
        let pipeline = build_subcategory_spec("Toys");
        assert_eq!(
            pipeline.stage_names(),
            vec!["$match", "$group", "$project", "$unwind", "$sort", "$group", "$project"]
        );
        let docs = pipeline.to_documents();
        assert_eq!(docs[0], json!({ "$match": { "category": "Toys" } }));
        assert_eq!(
            docs[1],
            json!({ "$group": { "_id": null, "subCategories": { "$addToSet": "$subCategory" } } })
        );
        assert_eq!(
            docs[5],
            json!({ "$group": { "_id": null, "subCategories": { "$push": "$subCategories" } } })
        );
        assert_eq!(docs[6], json!({ "$project": { "_id": 0, "subCategories": 1 } }));
    }

    #[test]
    fn search_builds_paged_regex_filter() {
        let spec = build_search_spec(" train ", 10, 3, Some("s-2")).unwrap();
        assert_eq!(
            spec.filter.to_document(),
            json!({
                "title": { "$regex": "train", "$options": "i" },
                "seller.id": "s-2"
            })
        );
        assert_eq!(spec.skip, 20);
        assert_eq!(spec.limit, Some(10));
        assert_eq!(spec.sort, None);
    }

    #[test]
    fn search_rejects_empty_text_and_bad_paging() {
        assert!(matches!(
            build_search_spec("", 10, 1, None),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(build_search_spec("   ", 10, 1, None).is_err());
        assert!(build_search_spec("kite", 0, 1, None).is_err());
        assert!(build_search_spec("kite", 10, 0, None).is_err());
    }

    #[test]
    fn update_writes_rating_review_count_and_seller() {
        let patch: ProductPatch = serde_json::from_value(json!({
            "stars": "4.5",
            "reviewsCount": 3,
            "seller": { "id": " s-9 " }
        }))
        .unwrap();
        let update = build_update_document(&patch).unwrap();
        assert_eq!(
            update.to_document(),
            json!({ "$set": { "reviewsCount": 3, "stars": 4.5, "seller.id": "s-9" } })
        );
    }

    #[test]
    fn update_rejects_out_of_range_stars() {
        let patch = ProductPatch {
            stars: Some(NumericInput::from(7.0)),
            ..ProductPatch::default()
        };
        assert!(matches!(
            build_update_document(&patch),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn update_skips_empty_price() {
        let patch = ProductPatch {
            title: Some("X".to_string()),
            price: Some(NumericInput::from("")),
            ..ProductPatch::default()
        };
        let update = build_update_document(&patch).unwrap();
        assert_eq!(update.to_document(), json!({ "$set": { "title": "X" } }));
    }

    #[test]
    fn update_coerces_numbers_to_float() {
        let patch = ProductPatch {
            price: Some(NumericInput::from("12")),
            list_price: Some(NumericInput::from(15.0)),
            quantity: Some(NumericInput::from("3")),
            in_stock: Some(false),
            description: Some("   ".to_string()),
            features: Some(vec![]),
            ..ProductPatch::default()
        };
        let update = build_update_document(&patch).unwrap();
        let set = update.set_fields();

        assert_eq!(set.len(), 4);
        assert!(set["price"].is_f64());
        assert_eq!(set["price"], json!(12.0));
        assert_eq!(set["listPrice"], json!(15.0));
        assert_eq!(set["quantity"], json!(3.0));
        assert_eq!(set["inStock"], json!(false));
    }

    #[test]
    fn update_with_nothing_to_set_is_invalid() {
        let patch = ProductPatch {
            title: Some(" ".to_string()),
            price: Some(NumericInput::from("")),
            ..ProductPatch::default()
        };
        assert!(matches!(
            build_update_document(&patch),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn update_rejects_non_numeric_price() {
        let patch = ProductPatch {
            price: Some(NumericInput::from("free")),
            ..ProductPatch::default()
        };
        assert!(build_update_document(&patch).is_err());
    }

    #[test]
    fn lookup_and_duplicate_filters() {
        let id = ProductId::new();
        assert_eq!(
            build_product_lookup(id).to_document(),
            json!({ "_id": id.to_string() })
        );
        assert_eq!(
            build_duplicate_product_filter("Kite", "s-1").to_document(),
            json!({ "title": "Kite", "seller.id": "s-1" })
        );
    }

    #[test]
    fn category_filter_requires_category() {
        let spec = build_category_filter_spec("Toys").unwrap();
        assert_eq!(spec.filter.to_document(), json!({ "category": "Toys" }));
        assert_eq!(spec.limit, None);
        assert!(build_category_filter_spec(" ").is_err());
    }

    #[test]
    fn pin_updates() {
        let blog = BlogId::new();
        assert_eq!(
            build_pin_update(blog, PinAction::Pin).to_document(),
            json!({ "$addToSet": { "blogs": blog.to_string() } })
        );
        assert_eq!(
            build_pin_update(blog, PinAction::Unpin).to_document(),
            json!({ "$pull": { "blogs": blog.to_string() } })
        );
    }

    proptest! {
        /// Property: building is deterministic (same inputs = same output).
        #[test]
        fn listing_is_deterministic(
            page in 1u64..1_000,
            limit in 1u64..500,
            key_idx in 0usize..6,
            seller in proptest::option::of("[a-z0-9]{1,12}")
        ) {
            let key = SortKey::ALL[key_idx];
            let a = build_filter_sort_paginate_spec(page, limit, key, seller.as_deref()).unwrap();
            let b = build_filter_sort_paginate_spec(page, limit, key, seller.as_deref()).unwrap();
            prop_assert_eq!(&a, &b);

            let names = a.stage_names();
            prop_assert_eq!(names[names.len() - 2], "$skip");
            prop_assert_eq!(names[names.len() - 1], "$limit");
        }

        /// Property: the sample stage always asks for exactly `quantity`.
        #[test]
        fn sample_requests_quantity(quantity in 1u64..10_000) {
            let pipeline = build_random_sample_spec(quantity, None).unwrap();
            prop_assert_eq!(&pipeline.stages()[1], &Stage::Sample { size: quantity });
            prop_assert_eq!(pipeline, build_random_sample_spec(quantity, None).unwrap());
        }

        /// Property: search building is deterministic, metacharacters included.
        #[test]
        fn search_is_deterministic(text in "[a-zA-Z0-9 .*+?]{1,20}") {
            prop_assume!(!text.trim().is_empty());
            let a = build_search_spec(&text, 10, 1, None).unwrap();
            let b = build_search_spec(&text, 10, 1, None).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
