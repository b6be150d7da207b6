use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// What an open or decode failure on one track does to the session.
#[derive(Debug, Deserialize, Serialize, Clone, Default, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackErrorPolicy {
    /// Tear the whole session down, as any other failure would.
    #[default]
    AbortSession,
    /// Log the failure and continue with the next catalog entry.
    SkipTrack,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlayoutConfig {
    /// Directory whose regular files are streamed, re-read on every pass.
    pub catalog_path: PathBuf,
    /// Frames batched into one chunk.
    pub frame_count: NonZeroUsize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Chunks the listener connection may hold before the probe reports
    /// no capacity.
    #[serde(default = "default_write_queue_capacity")]
    pub write_queue_capacity: usize,
    #[serde(default)]
    pub on_track_error: TrackErrorPolicy,
}

impl PlayoutConfig {
    pub fn new(catalog_path: impl Into<PathBuf>, frame_count: NonZeroUsize) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            frame_count,
            poll_interval_ms: default_poll_interval_ms(),
            write_queue_capacity: default_write_queue_capacity(),
            on_track_error: TrackErrorPolicy::default(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_write_queue_capacity() -> usize {
    16
}
