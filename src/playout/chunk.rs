//! Chunk assembly and the live wire format.
//!
//! One chunk is at most `frame_count` consecutive frames of a single track.
//! On the wire it is the big-endian `u32` index followed by the frame bytes,
//! with no length prefix; the transport's message framing carries the
//! boundary.

use std::num::NonZeroUsize;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{audio::FrameSource, common::PlayoutError};

/// Size of the index header in front of every chunk on the wire.
pub const INDEX_LEN: usize = 4;

/// Concatenated frames gathered from one track, not yet sequenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub payload: Bytes,
    pub frames: usize,
}

/// A sequenced batch, ready for the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: u32,
    pub payload: Bytes,
    /// Frames concatenated in `payload`; not transmitted.
    pub frames: usize,
}

impl Chunk {
    pub fn new(index: u32, batch: Batch) -> Self {
        Self {
            index,
            payload: batch.payload,
            frames: batch.frames,
        }
    }

    /// Wire encoding: `index` (u32 BE) followed by the payload.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(INDEX_LEN + self.payload.len());
        buf.put_u32(self.index);
        buf.extend_from_slice(&self.payload);
        buf.freeze()
    }
}

/// Splits one wire message into its index and frame bytes.
pub fn decode_message(mut message: Bytes) -> Option<(u32, Bytes)> {
    if message.len() < INDEX_LEN {
        return None;
    }
    let index = message.get_u32();
    Some((index, message))
}

/// Groups a track's frames into batches of at most `frame_count`.
///
/// Borrowing the source keeps ownership of the track with the caller, so the
/// file is released when the caller's scope ends, whatever the exit path.
pub struct ChunkAssembler<'a> {
    frames: &'a mut dyn FrameSource,
    frame_count: NonZeroUsize,
    exhausted: bool,
}

impl<'a> ChunkAssembler<'a> {
    pub fn new(frames: &'a mut dyn FrameSource, frame_count: NonZeroUsize) -> Self {
        Self {
            frames,
            frame_count,
            exhausted: false,
        }
    }

    /// The next batch, a trailing partial batch, or `None` when the track is done.
    pub fn next_batch(&mut self) -> Result<Option<Batch>, PlayoutError> {
        if self.exhausted {
            return Ok(None);
        }

        let mut payload = BytesMut::new();
        let mut frames = 0;
        while frames < self.frame_count.get() {
            match self.frames.next_frame()? {
                Some(frame) => {
                    payload.extend_from_slice(&frame);
                    frames += 1;
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        if frames == 0 {
            return Ok(None);
        }
        Ok(Some(Batch {
            payload: payload.freeze(),
            frames,
        }))
    }
}
