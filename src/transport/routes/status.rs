use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::{playout::SessionStatus, server::AppState};

/// GET /status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.engine.status())
}
