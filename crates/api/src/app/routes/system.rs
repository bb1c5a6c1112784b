use axum::http::StatusCode;

pub async fn greeting() -> &'static str {
    "Hello from TimToys Server!"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
