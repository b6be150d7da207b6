//! Frame sources: lazy, forward-only sequences of opaque frame payloads.
//!
//! A source owns the underlying file for as long as it lives. Dropping it,
//! whether exhausted or not, closes the file.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use symphonia::core::{errors::Error, formats::FormatReader};
use tracing::{debug, trace};

use crate::{
    audio::demux::{Demuxed, open_format, sniff},
    common::{PlayoutError, types::AudioFormat},
};

pub trait FrameSource: Send {
    /// Next frame payload, or `None` once the track is exhausted.
    fn next_frame(&mut self) -> Result<Option<Bytes>, PlayoutError>;
}

pub type BoxedFrameSource = Box<dyn FrameSource>;

/// Opens a catalog track as a frame source.
pub trait FrameOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<BoxedFrameSource, PlayoutError>;
}

/// Yields each demuxed packet of a file as one frame, still encoded.
///
/// For MPEG audio every packet is one complete frame, header included, which
/// a receiver can decode on its own.
pub struct PacketFrames {
    path: PathBuf,
    format: Box<dyn FormatReader>,
    track_id: u32,
}

impl PacketFrames {
    pub fn open(path: &Path) -> Result<Self, PlayoutError> {
        let mut file = File::open(path).map_err(|e| PlayoutError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let kind = match AudioFormat::from_path(path) {
            AudioFormat::Unknown => sniff(&mut file).map_err(|e| PlayoutError::Open {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
            known => known,
        };

        let Demuxed { format, track_id } =
            open_format(Box::new(file), kind).map_err(|e| PlayoutError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        debug!("Opened {} as {:?} (track {})", path.display(), kind, track_id);

        Ok(Self {
            path: path.to_path_buf(),
            format,
            track_id,
        })
    }
}

impl FrameSource for PacketFrames {
    fn next_frame(&mut self) -> Result<Option<Bytes>, PlayoutError> {
        loop {
            match self.format.next_packet() {
                Ok(packet) if packet.track_id() == self.track_id => {
                    return Ok(Some(Bytes::from(packet.data)));
                }
                Ok(_) => continue,
                Err(Error::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    trace!("End of {}", self.path.display());
                    return Ok(None);
                }
                Err(e) => {
                    return Err(PlayoutError::Decode {
                        path: self.path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

impl Drop for PacketFrames {
    fn drop(&mut self) {
        trace!("Released {}", self.path.display());
    }
}

/// Opens catalog files through symphonia's demuxers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaOpener;

impl FrameOpener for SymphoniaOpener {
    fn open(&self, path: &Path) -> Result<BoxedFrameSource, PlayoutError> {
        Ok(Box::new(PacketFrames::open(path)?))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, joint stereo, no CRC.
    const MP3_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];
    /// 144 * 128000 / 44100, no padding.
    const MP3_FRAME_LEN: usize = 417;

    /// Silent but well-formed MP3 frames.
    pub(crate) fn mp3_frames(count: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(count * MP3_FRAME_LEN);
        for _ in 0..count {
            data.extend_from_slice(&MP3_HEADER);
            data.resize(data.len() + MP3_FRAME_LEN - MP3_HEADER.len(), 0);
        }
        data
    }

    #[test]
    fn mp3_packets_are_whole_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.mp3");
        std::fs::write(&path, mp3_frames(12)).unwrap();

        let mut frames = SymphoniaOpener.open(&path).unwrap();
        let mut count = 0;
        while let Some(frame) = frames.next_frame().unwrap() {
            assert_eq!(frame.len(), MP3_FRAME_LEN);
            assert_eq!(&frame[..2], &MP3_HEADER[..2]);
            count += 1;
        }
        assert_eq!(count, 12);
        assert!(frames.next_frame().unwrap().is_none());
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SymphoniaOpener.open(&dir.path().join("nope.mp3"));
        assert!(matches!(result, Err(PlayoutError::Open { .. })));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.bin");
        std::fs::write(&path, vec![0x42u8; 2048]).unwrap();
        let result = SymphoniaOpener.open(&path);
        assert!(matches!(result, Err(PlayoutError::Decode { .. })));
    }
}
