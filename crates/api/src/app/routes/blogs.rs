use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use toyshelf_core::BlogId;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_blogs))
        .route("/:id", get(get_blog))
}

pub async fn list_blogs(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.blogs().await {
        Ok(blogs) => (StatusCode::OK, Json(blogs)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_blog(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: BlogId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.blog(id).await {
        Ok(blog) => (StatusCode::OK, Json(blog)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
