//! Fixed dimensions of the Mode S receiver pipeline.
//!
//! These mirror the `#define`s at the top of the original C receiver: a
//! polyphase filter bank of `N_FILTERS` phases and `FILTER_LEN` taps, a
//! `PROCESS_BLOCK_SIZE`-sample block pushed through the pipeline at a time,
//! and the Mode S frame-length constants.

/// Number of taps per fractional-delay filter. Must be a power of two.
pub const FILTER_LEN: usize = 32;

/// Number of fractional-delay phases (sub-sample offsets) in the filter bank.
pub const N_FILTERS: usize = 4;

/// Number of complex samples processed per block.
///
/// Must be a multiple of 256 so that hardware buffer sizes stay a multiple
/// of 512 bytes; chosen large enough that the probability of a message
/// straddling a block boundary is negligible.
pub const PROCESS_BLOCK_SIZE: usize = 256 * 1024;

/// Length of the Mode S preamble, in samples (8 microseconds at 2 Msps).
pub const PREAMBLE_SAMPLES: usize = 16;

/// Two samples are taken per PPM half-bit.
pub const SAMPLES_PER_BIT: usize = 2;

/// Maximum message length in bits (DF17/18 extended squitter).
pub const MESSAGE_BITS_MAX: usize = 112;

/// Short message length in bits (e.g. DF4/DF5/DF11).
pub const MESSAGE_BITS_SHORT: usize = 56;

/// Number of bits in the downlink format field at the start of every message.
pub const DF_BITS: usize = 5;

/// Number of entries held by the ICAO directory's ring buffer.
pub const ICAO_LIST_SIZE: usize = 256;

/// Number of bits in an ICAO aircraft address.
pub const ICAO_N_BITS: u32 = 24;

/// One bit position within the preamble/message timeline, identified by
/// which fractional-delay phase produced it and the sample offset into the
/// current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub filter_no: usize,
    pub sample_start: usize,
}
