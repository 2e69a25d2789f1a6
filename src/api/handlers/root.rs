use axum::response::{IntoResponse, Json};
use serde_json::json;

use crate::GIT_COMMIT_HASH;

// axum handler for the undocumented root banner
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
    }))
}

#[cfg(test)]
mod tests {
    use super::root;
    use axum::response::IntoResponse;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn root_banner_is_ok() {
        let response = root().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
