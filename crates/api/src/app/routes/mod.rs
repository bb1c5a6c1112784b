use axum::{Router, routing::get};

pub mod auth;
pub mod blogs;
pub mod categories;
pub mod pins;
pub mod products;
pub mod system;

/// Router for every endpoint that needs no token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::greeting))
        .route("/health", get(system::health))
        .merge(products::router())
        .merge(categories::router())
        .nest("/blogs", blogs::router())
        .nest("/auth", auth::router())
}

/// Router for all authenticated (per-user) endpoints.
pub fn protected_router() -> Router {
    Router::new().nest("/pins", pins::router())
}
