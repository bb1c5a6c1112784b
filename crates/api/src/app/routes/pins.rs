use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use toyshelf_core::BlogId;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_pins))
        .route("/:blog_id", put(pin_blog).delete(unpin_blog))
}

pub async fn list_pins(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.catalog.pinned_blogs(user.user_id()).await {
        Ok(pinned) => (StatusCode::OK, Json(pinned)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn pin_blog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(blog_id): Path<String>,
) -> axum::response::Response {
    let blog_id: BlogId = match errors::parse_id(&blog_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.pin_blog(user.user_id(), blog_id).await {
        Ok(pins) => (StatusCode::OK, Json(pins)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn unpin_blog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(blog_id): Path<String>,
) -> axum::response::Response {
    let blog_id: BlogId = match errors::parse_id(&blog_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.unpin_blog(user.user_id(), blog_id).await {
        Ok(pins) => (StatusCode::OK, Json(pins)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
