use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use futures::{StreamExt, TryStreamExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::{common::ApiError, server::AppState};

const PATH: &str = "/stream";

/// GET /stream
///
/// Every regular file of the catalog, in playout order, as one chunked body.
/// Files are opened lazily as the body is consumed.
pub async fn catalog_stream(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let catalog = state.engine.catalog();
    let tracks = tokio::task::spawn_blocking(move || catalog.tracks())
        .await
        .map_err(|e| ApiError::internal(format!("catalog task failed: {}", e), PATH))?
        .map_err(|e| {
            warn!("GET {}: {}", PATH, e);
            ApiError::internal(e.to_string(), PATH)
        })?;

    debug!("GET {}: streaming {} files", PATH, tracks.len());

    let body = futures::stream::iter(tracks)
        .then(|path| async move { tokio::fs::File::open(path).await })
        .map_ok(ReaderStream::new)
        .try_flatten();

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Body::from_stream(body),
    )
        .into_response())
}
