//! Live playout: catalog → frames → chunks → one listener.
//!
//! ```text
//!  Catalog ──> FrameSource ──> ChunkAssembler ──> Sequencer ──> ChunkSink
//!  (per pass)   (per track)     (≤ frame_count)   (per session)  (probe, write)
//! ```
//!
//! [`PlayoutEngine::spawn`] runs the loop on a dedicated thread. The accept
//! path hands connections to [`PlayoutEngine::attach`]; the loop picks them up,
//! streams one full catalog pass and goes back to waiting.

pub mod chunk;
pub mod engine;
pub mod sequencer;
pub mod session;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use chunk::{Batch, Chunk, ChunkAssembler, decode_message};
pub use engine::PlayoutEngine;
pub use sequencer::Sequencer;
pub use session::{LifecycleState, SessionManager, SessionStatus};
pub use sink::{ChannelSink, ChunkSink, SharedSink};
