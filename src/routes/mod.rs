use axum::{Router, extract::DefaultBodyLimit};
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod basket;
pub mod baskets;
pub mod catalogs;
pub mod doc;
pub mod health;
pub mod pages;
pub mod params;
pub mod products;
pub mod reviews;
pub mod users;

/// Largest accepted request body. Uploads arrive as raw bodies.
pub const BODY_LIMIT: usize = 8 * 1024 * 1024;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/basket", basket::router())
        .nest("/admin", admin::router())
}

/// Cap request bodies at [`BODY_LIMIT`]. axum's own extractor limit is raised to the same
/// value, otherwise `Bytes` bodies stop at its 2 MB default.
pub fn with_body_limit<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, Bytes},
        http::{Request, StatusCode},
        routing::post,
    };
    use tower::ServiceExt;

    fn upload_router() -> Router {
        with_body_limit(Router::new().route(
            "/upload",
            post(|body: Bytes| async move { body.len().to_string() }),
        ))
    }

    async fn upload(size: usize) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header("content-length", size)
            .body(Body::from(vec![0u8; size]))
            .unwrap();
        upload_router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn uploads_above_extractor_default_are_accepted() {
        assert_eq!(upload(3 * 1024 * 1024).await, StatusCode::OK);
        assert_eq!(upload(BODY_LIMIT).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn uploads_above_limit_are_rejected() {
        assert_eq!(upload(BODY_LIMIT + 1).await, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
