use std::sync::Arc;

use axum::{Router, http::Uri, middleware, routing::get};
use tower_http::services::ServeDir;

use crate::{
    common::ApiError,
    server::AppState,
    transport::{
        middleware::add_response_headers,
        routes::{catalog_stream, get_status},
    },
};

/// Bulk download, status, and static assets as the fallback.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/stream", get(catalog_stream))
        .route("/status", get(get_status));

    router = match &state.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };

    router
        .layer(middleware::from_fn(add_response_headers))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found("no such route", uri.path())
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{configs::PlayoutConfig, playout::PlayoutEngine};

    fn state(catalog: &std::path::Path, static_dir: Option<&std::path::Path>) -> Arc<AppState> {
        let config = PlayoutConfig::new(catalog, NonZeroUsize::new(4).unwrap());
        Arc::new(AppState {
            engine: PlayoutEngine::from_config(config),
            static_dir: static_dir.map(|p| p.to_path_buf()),
        })
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, axum::body::Bytes) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, to_bytes(response.into_body(), usize::MAX).await.unwrap())
    }

    #[tokio::test]
    async fn stream_concatenates_catalog_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.mp3"), b"second").unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"first-").unwrap();
        std::fs::create_dir(dir.path().join("art")).unwrap();

        let (status, body) = get(router(state(dir.path(), None)), "/stream").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"first-second");
    }

    #[tokio::test]
    async fn stream_of_empty_catalog_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(router(state(dir.path(), None)), "/stream").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn unreadable_catalog_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let (status, body) = get(router(state(&missing, None)), "/stream").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 500);
        assert_eq!(json["path"], "/stream");
    }

    #[tokio::test]
    async fn status_reports_idle_engine() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(router(state(dir.path(), None)), "/status").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["chunksSent"], 0);
    }

    #[tokio::test]
    async fn unknown_route_without_webroot_is_json_404() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(router(state(dir.path(), None)), "/index.html").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Not Found");
        assert_eq!(json["path"], "/index.html");
    }

    #[tokio::test]
    async fn static_files_are_the_fallback() {
        let catalog = tempfile::tempdir().unwrap();
        let webroot = tempfile::tempdir().unwrap();
        std::fs::write(webroot.path().join("index.html"), b"<html></html>").unwrap();

        let app = router(state(catalog.path(), Some(webroot.path())));
        let (status, body) = get(app, "/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"<html></html>");
    }
}
