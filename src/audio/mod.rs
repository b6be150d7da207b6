pub mod demux;
pub mod frames;

pub use frames::{BoxedFrameSource, FrameOpener, FrameSource, PacketFrames, SymphoniaOpener};
