use std::{path::PathBuf, sync::Arc};

use crate::{configs::Config, playout::PlayoutEngine};

/// State shared by the HTTP and WebSocket listeners.
pub struct AppState {
    pub engine: Arc<PlayoutEngine>,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(engine: Arc<PlayoutEngine>, config: &Config) -> Self {
        Self {
            engine,
            static_dir: config.server.static_dir.as_ref().map(PathBuf::from),
        }
    }
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
