//! Container detection by header byte sniffing.

use std::io::{Read, Seek, SeekFrom};

use crate::common::types::AudioFormat;

/// Bytes read from the head of a file when its extension says nothing.
pub const SNIFF_LEN: usize = 12;

/// Sniff the container format from the first bytes of a file.
///
/// Needs at least 4 bytes; anything shorter or unrecognised is
/// `AudioFormat::Unknown`.
pub fn detect_format(header: &[u8]) -> AudioFormat {
    if header.len() < 4 {
        return AudioFormat::Unknown;
    }

    match header {
        [0x1A, 0x45, 0xDF, 0xA3, ..] => AudioFormat::Webm,
        [b'O', b'g', b'g', b'S', ..] => AudioFormat::Ogg,
        [b'f', b'L', b'a', b'C', ..] => AudioFormat::Flac,
        [b'I', b'D', b'3', ..] => AudioFormat::Mp3,
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => AudioFormat::Mp4,
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => AudioFormat::Wav,
        // ADTS shares the 12-bit sync with MPEG audio but has layer bits 00.
        [0xFF, b1, ..] if b1 & 0xF6 == 0xF0 => AudioFormat::Aac,
        [0xFF, b1, ..] if b1 & 0xE0 == 0xE0 => AudioFormat::Mp3,
        _ => AudioFormat::Unknown,
    }
}

/// Reads the head of `reader`, sniffs it, and rewinds to the start.
pub fn sniff<R: Read + Seek>(reader: &mut R) -> std::io::Result<AudioFormat> {
    let mut header = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match reader.read(&mut header[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    reader.seek(SeekFrom::Start(0))?;
    Ok(detect_format(&header[..filled]))
}
