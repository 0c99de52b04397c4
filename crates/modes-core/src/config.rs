//! Decoder configuration.
//!
//! The original receiver wired its error-correction behaviour through two
//! process-wide `const`s (`fix_xored_crcs`, `fix_2_bit_errors`). Here they
//! are fields of a single value threaded through the decoder so the CLI can
//! set them per run instead of at compile time.

use serde::{Deserialize, Serialize};

/// Correlation score (in `[-1, 1]`) a preamble candidate must exceed to be
/// offered to the demodulator. `0.0` means mark and space energy are equal.
pub const DEFAULT_THRESHOLD: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Attempt single-bit repair on messages whose CRC is XORed with the
    /// aircraft address. More expensive than the plain-CRC case since it
    /// requires one directory lookup per candidate bit.
    pub fix_xored_crcs: bool,
    /// Attempt double-bit repair (a DF-field flip combined with a second
    /// flip, or two flips outside the DF field on plain-CRC messages).
    pub fix_2_bit_errors: bool,
    /// Preamble correlation threshold.
    pub detect_threshold: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            fix_xored_crcs: false,
            fix_2_bit_errors: false,
            detect_threshold: DEFAULT_THRESHOLD,
        }
    }
}
