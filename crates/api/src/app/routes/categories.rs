use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/sub_categories", get(list_subcategories))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.categories().await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_subcategories(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CategoryQuery>,
) -> axum::response::Response {
    match services.catalog.subcategories(query.category()).await {
        Ok(names) => (StatusCode::OK, Json(names)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
