use std::path::PathBuf;

use serde::Serialize;

/// Errors raised while streaming the catalog to a listener.
///
/// Every variant is fatal to the current session (subject to
/// [`TrackErrorPolicy`](crate::configs::TrackErrorPolicy) for `Open`/`Decode`),
/// never to the playout thread itself.
#[derive(Debug, thiserror::Error)]
pub enum PlayoutError {
    #[error("failed to read catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open track {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("failed to read frames from {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("listener connection is gone")]
    ConnectionGone,

    #[error("listener write queue overflowed")]
    Backpressure,

    #[error("playout engine is stopped")]
    Stopped,
}

impl PlayoutError {
    /// `true` for errors that belong to a single track rather than the
    /// catalog or the connection.
    pub fn is_track_local(&self) -> bool {
        matches!(self, Self::Open { .. } | Self::Decode { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config.toml or config.default.toml not found")]
    NotFound,

    #[error("{0} is empty")]
    Empty(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// JSON error body returned by the HTTP listener.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    /// HTTP status code.
    pub status: u16,
    /// HTTP status reason phrase (e.g. "Not Found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// The request path that caused the error.
    pub path: String,
}

impl ApiError {
    fn build(status: u16, error: &str, message: String, path: String) -> Self {
        Self {
            timestamp: crate::server::now_ms(),
            status,
            error: error.into(),
            message,
            path,
        }
    }

    pub fn not_found(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::build(404, "Not Found", message.into(), path.into())
    }

    pub fn internal(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::build(500, "Internal Server Error", message.into(), path.into())
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status)
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}
