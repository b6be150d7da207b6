//! Demux layer: container probing through symphonia.
//!
//! Only the demuxer is used. Packets are handed on still encoded, so no codec
//! is instantiated here.

pub mod format;

pub use format::{detect_format, sniff};
use symphonia::core::{
    codecs::CODEC_TYPE_NULL,
    errors::Error,
    formats::{FormatOptions, FormatReader},
    io::{MediaSource, MediaSourceStream},
    meta::MetadataOptions,
    probe::Hint,
};

use crate::common::types::AudioFormat;

/// A probed container positioned at its first packet.
pub struct Demuxed {
    pub format: Box<dyn FormatReader>,
    pub track_id: u32,
}

/// Probe `source` and select its first audio track.
pub fn open_format(source: Box<dyn MediaSource>, kind: AudioFormat) -> Result<Demuxed, Error> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    let ext = kind.as_ext();
    if !ext.is_empty() {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let format = probed.format;
    let track_id = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .map(|t| t.id)
        .ok_or_else(|| {
            Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no audio track found",
            ))
        })?;

    Ok(Demuxed { format, track_id })
}
