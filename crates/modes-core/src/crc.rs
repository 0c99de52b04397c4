//! Mode S CRC checking and bit-error correction.
//!
//! Mode S uses a 24-bit CRC whose remainder, for addressed downlink formats,
//! is XORed with the transmitting aircraft's ICAO address. `crc_table[b]`
//! gives the remainder contributed by setting bit `b` alone, so the
//! remainder of any message is simply the XOR of the table entries for its
//! set bits (the linearity the error-correction steps below exploit).
//!
//! The demodulator always extracts a full `MESSAGE_BITS_MAX`-bit buffer
//! regardless of the message's true length (`hard[0]` only selects how many
//! of those bits take part in the CRC); every function here takes the full
//! buffer and re-reads `hard[0]` on each call, exactly as a DF-field bit
//! flip in `check_and_correct`'s Step 2 can change which length is in play
//! for the very next CRC check.

use crate::config::DecoderConfig;
use crate::directory::{IcaoDirectory, Lookup};
use crate::types::{DF_BITS, MESSAGE_BITS_MAX, MESSAGE_BITS_SHORT};

/// Per-bit CRC remainder contribution, indexed `[0, MESSAGE_BITS_MAX)`.
///
/// Short (56-bit) messages index from `MESSAGE_BITS_SHORT` onward, i.e. with
/// `off = MESSAGE_BITS_SHORT`.
pub const CRC_TABLE: [u32; MESSAGE_BITS_MAX] = [
    0x3935ea, 0x1c9af5, 0xf1b77e, 0x78dbbf, 0xc397db, 0x9e31e9, 0xb0e2f0, 0x587178, 0x2c38bc,
    0x161c5e, 0x0b0e2f, 0xfa7d13, 0x82c48d, 0xbe9842, 0x5f4c21, 0xd05c14, 0x682e0a, 0x341705,
    0xe5f186, 0x72f8c3, 0xc68665, 0x9cb936, 0x4e5c9b, 0xd8d449, 0x939020, 0x49c810, 0x24e408,
    0x127204, 0x093902, 0x049c81, 0xfdb444, 0x7eda22, 0x3f6d11, 0xe04c8c, 0x702646, 0x381323,
    0xe3f395, 0x8e03ce, 0x4701e7, 0xdc7af7, 0x91c77f, 0xb719bb, 0xa476d9, 0xadc168, 0x56e0b4,
    0x2b705a, 0x15b82d, 0xf52612, 0x7a9309, 0xc2b380, 0x6159c0, 0x30ace0, 0x185670, 0x0c2b38,
    0x06159c, 0x030ace, 0x018567, 0xff38b7, 0x80665f, 0xbfc92b, 0xa01e91, 0xaff54c, 0x57faa6,
    0x2bfd53, 0xea04ad, 0x8af852, 0x457c29, 0xdd4410, 0x6ea208, 0x375104, 0x1ba882, 0x0dd441,
    0xf91024, 0x7c8812, 0x3e4409, 0xe0d800, 0x706c00, 0x383600, 0x1c1b00, 0x0e0d80, 0x0706c0,
    0x038360, 0x01c1b0, 0x00e0d8, 0x00706c, 0x003836, 0x001c1b, 0xfff409, 0x800000, 0x400000,
    0x200000, 0x100000, 0x080000, 0x040000, 0x020000, 0x010000, 0x008000, 0x004000, 0x002000,
    0x001000, 0x000800, 0x000400, 0x000200, 0x000100, 0x000080, 0x000040, 0x000020, 0x000010,
    0x000008, 0x000004, 0x000002, 0x000001,
];

/// Result of checking a message's CRC.
///
/// `icao_in_message` is true for DF11/17/18, whose CRC is plain (not XORed
/// with the address). When `ok` and `icao_in_message`, `remainder` is
/// always `0`; when `ok` and not `icao_in_message`, `remainder` *is* the
/// identifying ICAO address recovered from the XORed trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcResult {
    pub ok: bool,
    pub remainder: u32,
    pub icao_in_message: bool,
}

/// Message length selected by `hard[0]`.
#[inline]
fn message_len(hard: &[u8; MESSAGE_BITS_MAX]) -> usize {
    if hard[0] == 1 {
        MESSAGE_BITS_MAX
    } else {
        MESSAGE_BITS_SHORT
    }
}

/// `off` into `CRC_TABLE` for a message of length `m`.
#[inline]
fn table_offset(m: usize) -> usize {
    if m == MESSAGE_BITS_MAX {
        0
    } else {
        MESSAGE_BITS_SHORT
    }
}

const DF11: u8 = 0b01011;
const DF17: u8 = 0b10001;
const DF18: u8 = 0b10010;

/// Downlink format is the first `DF_BITS` hard bits, big-endian.
fn downlink_format(hard: &[u8; MESSAGE_BITS_MAX]) -> u8 {
    let mut df = 0u8;
    for &b in &hard[..DF_BITS] {
        df = (df << 1) | b;
    }
    df
}

/// Check the CRC of `hard`, reading `hard[0]` to pick the message length.
pub fn check(hard: &[u8; MESSAGE_BITS_MAX], directory: &IcaoDirectory) -> CrcResult {
    let m = message_len(hard);
    let off = table_offset(m);

    let mut remainder = 0u32;
    for (b, &bit) in hard[..m].iter().enumerate() {
        if bit == 1 {
            remainder ^= CRC_TABLE[b + off];
        }
    }

    let df = downlink_format(hard);
    let icao_in_message = matches!(df, DF11 | DF17 | DF18);

    let ok = if icao_in_message {
        remainder == 0
    } else {
        matches!(directory.lookup(remainder), Lookup::Hit)
    };

    CrcResult {
        ok,
        remainder,
        icao_in_message,
    }
}

/// Step 1 of error correction: search for a single bit outside the DF field
/// whose flip would clear the CRC. Returns the flipped bit index on success.
///
/// When `icao_in_message` the search is a direct table lookup (the plain-CRC
/// case). Otherwise it is only attempted when `fix_xored_crcs` is enabled,
/// since it requires one directory lookup per candidate bit. Never touches
/// the DF field, since flipping it would invalidate `remainder`.
pub fn fix_one_bit(
    hard: &mut [u8; MESSAGE_BITS_MAX],
    remainder: u32,
    icao_in_message: bool,
    directory: &IcaoDirectory,
    config: &DecoderConfig,
) -> Option<usize> {
    let m = message_len(hard);
    let off = table_offset(m);

    if icao_in_message {
        for b in DF_BITS..m {
            if CRC_TABLE[b + off] == remainder {
                hard[b] ^= 1;
                return Some(b);
            }
        }
        None
    } else if config.fix_xored_crcs {
        for b in DF_BITS..m {
            if matches!(directory.lookup(remainder ^ CRC_TABLE[b + off]), Lookup::Hit) {
                hard[b] ^= 1;
                return Some(b);
            }
        }
        None
    } else {
        None
    }
}

/// Outcome of the full three-step error-correction search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Message passed CRC with no correction necessary.
    Clean,
    /// A single bit outside the DF field was flipped.
    SingleBit(usize),
    /// One DF bit was flipped.
    DfBit(usize),
    /// A DF bit plus one bit outside the DF field were flipped.
    TwoBit(usize, usize),
}

/// Run the full demodulate-time CRC check and, on failure, the three-step
/// error-correction search described in the receiver's error-correction
/// design. Mutates `hard` in place to reflect any accepted correction;
/// `hard[0]` after return selects the final message length.
///
/// Returns the final `CrcResult` (post-correction) together with which
/// correction, if any, was applied. `None` means the message could not be
/// recovered and should be dropped.
pub fn check_and_correct(
    hard: &mut [u8; MESSAGE_BITS_MAX],
    directory: &IcaoDirectory,
    config: &DecoderConfig,
) -> Option<(CrcResult, Correction)> {
    let result = check(hard, directory);
    if result.ok {
        return Some((result, Correction::Clean));
    }

    let icao_in_message_orig = result.icao_in_message;

    // Step 1: single flip outside the DF field.
    if let Some(b) = fix_one_bit(hard, result.remainder, result.icao_in_message, directory, config) {
        let fixed = check(hard, directory);
        debug_assert!(fixed.ok);
        return Some((fixed, Correction::SingleBit(b)));
    }

    // Step 2: flip one DF bit, which may reclassify icao_in_message (and,
    // for i == 0, the message length itself).
    for i in 0..DF_BITS {
        hard[i] ^= 1;
        let retry = check(hard, directory);
        if retry.ok {
            return Some((retry, Correction::DfBit(i)));
        }
        if config.fix_2_bit_errors && retry.icao_in_message {
            if let Some(j) = fix_one_bit(hard, retry.remainder, true, directory, config) {
                let fixed = check(hard, directory);
                debug_assert!(fixed.ok);
                return Some((fixed, Correction::TwoBit(i, j)));
            }
        }
        hard[i] ^= 1;
    }

    // Step 3: two flips outside DF (plain CRC only), assuming the DF field
    // itself was received correctly.
    if config.fix_2_bit_errors && icao_in_message_orig {
        let m = message_len(hard);
        for i in DF_BITS..m {
            hard[i] ^= 1;
            let retry = check(hard, directory);
            if let Some(j) = fix_one_bit(hard, retry.remainder, retry.icao_in_message, directory, config) {
                let fixed = check(hard, directory);
                debug_assert!(fixed.ok);
                return Some((fixed, Correction::TwoBit(i, j)));
            }
            hard[i] ^= 1;
        }
    }

    None
}
