use axum::{http::header, response::IntoResponse};

/// Returns the `OpenAPI` document in YAML format with the crate version filled in.
pub async fn openapi_yaml() -> impl IntoResponse {
    let document = include_str!("../../openapi.yaml");
    let versioned = document.replace("version: 0.0.0", &format!("version: {}", env!("CARGO_PKG_VERSION")));

    ([(header::CONTENT_TYPE, "text/yaml")], versioned)
}
