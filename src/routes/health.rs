use axum::http::StatusCode;

pub async fn get() -> (StatusCode, String) {
    (StatusCode::OK, "healthy".to_string())
}

pub async fn root() -> (StatusCode, String) {
    (StatusCode::OK, "Impostor server running".to_string())
}
