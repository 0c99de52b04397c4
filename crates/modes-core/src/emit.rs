//! Decoded-message record formatting.
//!
//! Produces the receiver's one-line-per-decode stdout format; callers own
//! where the formatted string actually goes (a CLI prints it, a test
//! collects it into a `Vec<String>`).

use crate::demod::DecodedMessage;
use crate::types::{N_FILTERS, PROCESS_BLOCK_SIZE};

/// Format `message`, decoded from block `block_no`, as
/// `SSSSSSSSSSSSSS.PP: 0x<icao>, 0x<hex>;`.
pub fn format_record(block_no: u64, message: &DecodedMessage) -> String {
    let sample = block_no * PROCESS_BLOCK_SIZE as u64 + message.sample_start as u64;
    let phase_pct = 100 * message.filter_no / N_FILTERS;

    let mut hex = String::with_capacity(message.payload_nibbles.len());
    for &nibble in &message.payload_nibbles {
        hex.push(std::char::from_digit(nibble as u32, 16).expect("nibble is in [0, 16)"));
    }

    format!(
        "{:014}.{:02}: 0x{:06x}, 0x{};",
        sample, phase_pct, message.icao, hex
    )
}
