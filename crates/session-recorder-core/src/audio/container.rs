//! Streaming WAV container.
//!
//! The payload length of a live recording is unknown until capture stops, so
//! the header is written twice: once with a zero payload when the file is
//! created (which keeps the file playable mid-recording) and once more with
//! the real size during finalization.

use crate::{AudioFormat, CoreResult, RecorderError};

use std::{
    io::{Seek, SeekFrom, Write},
    panic::Location,
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Size of the canonical PCM WAV header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Bytes of the RIFF chunk that follow the size field, excluding the payload.
const RIFF_OVERHEAD: u32 = 36;

/// Largest payload whose RIFF chunk size still fits in 32 bits.
pub const MAX_PAYLOAD_BYTES: u64 = (u32::MAX - RIFF_OVERHEAD) as u64;

/// Writes and rewrites the 44-byte header of a PCM WAV file.
///
/// Layout (little-endian):
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + payload
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16
/// [20-21]  1 (linear PCM)
/// [22-23]  channels
/// [24-27]  sample rate
/// [28-31]  byte rate
/// [32-33]  block align
/// [34-35]  bits per sample
/// [36-39]  "data"
/// [40-43]  payload
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WavContainer {
    format: AudioFormat,
}

/// Decoded header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// PCM parameters declared in the `fmt ` chunk.
    pub format: AudioFormat,
    /// Declared size of the `data` chunk.
    pub payload_bytes: u32,
}

impl WavContainer {
    /// Creates a container writer for `format`.
    pub fn new(format: AudioFormat) -> Self {
        Self { format }
    }

    /// PCM parameters written into every header.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Encodes the header for a payload of `payload_bytes`.
    pub fn header(&self, payload_bytes: u32) -> [u8; WAV_HEADER_SIZE] {
        let mut header = [0u8; WAV_HEADER_SIZE];

        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&(RIFF_OVERHEAD + payload_bytes).to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");

        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&16u32.to_le_bytes());
        header[20..22].copy_from_slice(&1u16.to_le_bytes());
        header[22..24].copy_from_slice(&self.format.channels.to_le_bytes());
        header[24..28].copy_from_slice(&self.format.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&self.format.byte_rate().to_le_bytes());
        header[32..34].copy_from_slice(&self.format.block_align().to_le_bytes());
        header[34..36].copy_from_slice(&self.format.bit_depth.to_le_bytes());

        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&payload_bytes.to_le_bytes());

        header
    }

    /// Writes the header at offset 0, overwriting any previous header.
    ///
    /// The stream position is restored afterwards so appends continue where
    /// they left off. `payload_bytes` must not exceed [`MAX_PAYLOAD_BYTES`].
    #[track_caller]
    pub fn write_header<W: Write + Seek>(&self, out: &mut W, payload_bytes: u32) -> CoreResult<()> {
        if u64::from(payload_bytes) > MAX_PAYLOAD_BYTES {
            return Err(RecorderError::ContainerTooLarge {
                length: u64::from(payload_bytes) + WAV_HEADER_SIZE as u64,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let header = self.header(payload_bytes);

        let position = out.stream_position().map_err(|e| RecorderError::Io {
            context: "reading stream position".to_string(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        out.seek(SeekFrom::Start(0)).map_err(|e| RecorderError::Io {
            context: "seeking to header".to_string(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        out.write_all(&header).map_err(|e| RecorderError::Io {
            context: "writing WAV header".to_string(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        // A fresh file sits at 0; leave it positioned after the header.
        let resume_at = position.max(WAV_HEADER_SIZE as u64);
        out.seek(SeekFrom::Start(resume_at))
            .map_err(|e| RecorderError::Io {
                context: "restoring stream position".to_string(),
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    /// Rewrites the header with the payload size derived from the current
    /// stream length and returns that size.
    ///
    /// Derived from the length rather than a running counter, so calling it
    /// repeatedly always produces the same header.
    #[track_caller]
    #[instrument(skip(self, out))]
    pub fn finalize<W: Write + Seek>(&self, out: &mut W) -> CoreResult<u32> {
        let position = out.stream_position().map_err(|e| RecorderError::Io {
            context: "reading stream position".to_string(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let length = out.seek(SeekFrom::End(0)).map_err(|e| RecorderError::Io {
            context: "measuring container length".to_string(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        out.seek(SeekFrom::Start(position))
            .map_err(|e| RecorderError::Io {
                context: "restoring stream position".to_string(),
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        if length < WAV_HEADER_SIZE as u64 {
            return Err(RecorderError::CorruptContainer {
                length,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let payload = length - WAV_HEADER_SIZE as u64;
        if payload > MAX_PAYLOAD_BYTES {
            return Err(RecorderError::ContainerTooLarge {
                length,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let payload = payload as u32;
        self.write_header(out, payload)?;

        debug!(payload_bytes = payload, "WAV header finalized");

        Ok(payload)
    }
}

impl WavHeader {
    /// Parses the first [`WAV_HEADER_SIZE`] bytes of a container.
    #[track_caller]
    pub fn parse(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() < WAV_HEADER_SIZE {
            return Err(RecorderError::CorruptContainer {
                length: bytes.len() as u64,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let tags = [(0, b"RIFF"), (8, b"WAVE"), (12, b"fmt "), (36, b"data")];
        for (offset, tag) in tags {
            if &bytes[offset..offset + 4] != tag {
                return Err(RecorderError::InvalidHeader {
                    reason: format!(
                        "expected {:?} at offset {}",
                        String::from_utf8_lossy(tag),
                        offset
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        let u16_at = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        let u32_at = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };

        let audio_format = u16_at(20);
        if audio_format != 1 {
            return Err(RecorderError::InvalidHeader {
                reason: format!("audio format {} is not linear PCM", audio_format),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            format: AudioFormat {
                channels: u16_at(22),
                sample_rate: u32_at(24),
                bit_depth: u16_at(34),
            },
            payload_bytes: u32_at(40),
        })
    }

    /// Playback length implied by the payload size.
    ///
    /// Computed in 64 bits: a parsed header need not describe a format the
    /// recorder would accept, so its byte rate may not fit the 32-bit field.
    pub fn duration(&self) -> std::time::Duration {
        let byte_rate = self.format.bytes_per_second();
        if byte_rate == 0 {
            return std::time::Duration::ZERO;
        }
        std::time::Duration::from_secs_f64(f64::from(self.payload_bytes) / byte_rate as f64)
    }
}
