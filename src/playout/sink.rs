//! Flow-controlled sinks: the engine's view of the listener connection.

use std::sync::Arc;

use bytes::Bytes;
use flume::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::{common::PlayoutError, playout::chunk::Chunk};

/// A single listener connection.
///
/// The playout loop probes [`capacity_available`](ChunkSink::capacity_available)
/// before every [`write`](ChunkSink::write) and never writes while the probe
/// says no. Once the connection is gone both calls fail fast with
/// [`PlayoutError::ConnectionGone`].
pub trait ChunkSink: Send + Sync {
    fn capacity_available(&self) -> Result<bool, PlayoutError>;

    fn write(&self, chunk: &Chunk) -> Result<(), PlayoutError>;

    /// Closes the connection. Idempotent.
    fn close(&self);
}

pub type SharedSink = Arc<dyn ChunkSink>;

/// Sink backed by a bounded channel drained by the socket task.
///
/// The channel bound is the connection's write queue: a full channel means no
/// capacity. Closing drops the sender, which ends the socket task once it has
/// drained what was already queued.
pub struct ChannelSink {
    tx: Mutex<Option<Sender<Bytes>>>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, Receiver<Bytes>) {
        let (tx, rx) = flume::bounded(capacity);
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    pub fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .as_ref()
            .is_none_or(|tx| tx.is_disconnected())
    }
}

impl ChunkSink for ChannelSink {
    fn capacity_available(&self) -> Result<bool, PlayoutError> {
        match self.tx.lock().as_ref() {
            Some(tx) if !tx.is_disconnected() => Ok(!tx.is_full()),
            _ => Err(PlayoutError::ConnectionGone),
        }
    }

    fn write(&self, chunk: &Chunk) -> Result<(), PlayoutError> {
        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(PlayoutError::ConnectionGone)?;
        tx.try_send(chunk.encode()).map_err(|e| match e {
            // Only reachable if the queue filled between probe and write.
            TrySendError::Full(_) => PlayoutError::Backpressure,
            TrySendError::Disconnected(_) => PlayoutError::ConnectionGone,
        })
    }

    fn close(&self) {
        self.tx.lock().take();
    }
}
