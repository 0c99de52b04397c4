//! Block source abstraction.
//!
//! The raw I/Q source — a live dongle callback or a capture file replay —
//! is treated as an external collaborator. Both implementations satisfy a
//! single capability: hand over the next `2 * PROCESS_BLOCK_SIZE` raw bytes,
//! or report end-of-stream.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::types::PROCESS_BLOCK_SIZE;

/// Number of raw bytes in one block (2 bytes per complex sample).
pub const BLOCK_BYTES: usize = PROCESS_BLOCK_SIZE * 2;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading samples: {0}")]
    Io(#[from] std::io::Error),
    #[error("no hardware I/Q source compiled in; pass a capture file instead")]
    HardwareUnsupported,
    #[error("source cancelled")]
    Cancelled,
}

/// Outcome of a single `next_block` call.
pub enum SourceEvent {
    /// `buf` was filled with a full block of raw I/Q bytes.
    Ready,
    /// The stream ended before a full block could be filled. Any bytes
    /// already read for this call are discarded, matching the original
    /// receiver's behaviour of dropping a trailing partial block rather
    /// than attempting to decode it.
    Eof,
}

/// A source of fixed-size raw I/Q blocks.
pub trait BlockSource: Send {
    /// Fill `buf` (length `BLOCK_BYTES`) with the next block of raw bytes.
    fn next_block(&mut self, buf: &mut [u8]) -> Result<SourceEvent, SourceError>;
}

/// Replays a flat capture file of packed `u8` I/Q pairs.
pub struct FileSource {
    file: File,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self {
            file: File::open(path)?,
        })
    }
}

impl BlockSource for FileSource {
    fn next_block(&mut self, buf: &mut [u8]) -> Result<SourceEvent, SourceError> {
        debug_assert_eq!(buf.len(), BLOCK_BYTES);

        let mut total = 0;
        while total < buf.len() {
            let n = self.file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }

        if total == buf.len() {
            Ok(SourceEvent::Ready)
        } else {
            Ok(SourceEvent::Eof)
        }
    }
}

/// Live RTL-SDR style hardware source.
///
/// No hardware-access crate is part of this project's dependency stack, so
/// this is the documented integration seam rather than a working driver:
/// wiring it up to real hardware means binding an `rtlsdr`/`soapysdr`-style
/// FFI crate behind a cargo feature, the same way isolation backends are
/// feature-gated elsewhere in this workspace. Centre frequency 1090 MHz,
/// sample rate 2 Msps, maximum manual tuner gain, AGC enabled on the
/// baseband path, and a one-second buffer drain before the first block are
/// the device-configuration contract an implementation must honour.
pub struct RtlSdrSource {
    _device_index: u32,
}

impl RtlSdrSource {
    /// Always fails in this build: there is no hardware driver crate to
    /// bind to, so opening a live device is reported the same way a
    /// missing/absent dongle would be (fatal init error, exit code 1).
    pub fn open(_device_index: u32) -> Result<Self, SourceError> {
        Err(SourceError::HardwareUnsupported)
    }
}

impl BlockSource for RtlSdrSource {
    fn next_block(&mut self, _buf: &mut [u8]) -> Result<SourceEvent, SourceError> {
        Err(SourceError::HardwareUnsupported)
    }
}
