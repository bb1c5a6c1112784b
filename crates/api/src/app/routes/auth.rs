use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/token", post(issue_token))
}

/// Issue a signed bearer token for a user id (a new one when omitted).
pub async fn issue_token(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::TokenRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_argument", e.body_text()),
    };
    let user_id = match body.user_id() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.tokens.issue(user_id, Utc::now()) {
        Ok(issued) => {
            tracing::info!(user_id = %user_id, expires_at = %issued.expires_at, "token issued");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "user_id": user_id,
                    "token": issued.token,
                    "expires_at": issued.expires_at,
                })),
            )
                .into_response()
        }
        Err(e) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string()),
    }
}
