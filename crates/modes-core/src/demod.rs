//! PPM soft/hard bit extraction and message assembly.
//!
//! Turns a preamble [`Candidate`](crate::types::Candidate) into hard message
//! bits, runs CRC verification and correction, and resolves the message's
//! ICAO address — either read straight out of the payload (DF11/17/18) or
//! recovered from an XORed CRC trailer via the directory.

use crate::block::InterpBuffer;
use crate::config::DecoderConfig;
use crate::crc::{self, Correction};
use crate::directory::{is_reserved, IcaoDirectory, Lookup};
use crate::types::{Candidate, MESSAGE_BITS_MAX, PREAMBLE_SAMPLES};

/// A fully decoded, CRC-valid Mode S message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Sample offset, within the block, of the start of the preamble.
    pub sample_start: usize,
    /// Which fractional-delay phase produced the decode.
    pub filter_no: usize,
    /// Message length in bits (56 or 112).
    pub bits: usize,
    /// The identified transmitting aircraft.
    pub icao: u32,
    /// `hard[0..bits-24)` packed big-endian, four bits per nibble.
    pub payload_nibbles: Vec<u8>,
}

/// Extract soft/hard bits for phase `candidate.filter_no` starting just past
/// the preamble, up to the maximum message length; the caller truncates to
/// the actual length once `hard[0]` is known.
fn extract_hard_bits(interp: &InterpBuffer, candidate: &Candidate) -> [u8; MESSAGE_BITS_MAX] {
    let mag = &interp.mag[candidate.filter_no];
    let start = candidate.sample_start + PREAMBLE_SAMPLES;

    let mut hard = [0u8; MESSAGE_BITS_MAX];
    for (b, slot) in hard.iter_mut().enumerate() {
        let a = mag[start + 2 * b];
        let c = mag[start + 2 * b + 1];
        let soft = 0.5 + 0.5 * (a - c) / (a + c);
        *slot = (soft > 0.5) as u8;
    }
    hard
}

/// Big-endian 24-bit address from `hard[8..32)`.
fn extract_payload_icao(hard: &[u8]) -> u32 {
    let mut icao = 0u32;
    for &bit in &hard[8..32] {
        icao = (icao << 1) | bit as u32;
    }
    icao
}

fn pack_nibbles(hard: &[u8]) -> Vec<u8> {
    hard.chunks(4)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
        .collect()
}

/// Demodulate and validate the message at `candidate`. Returns `None` if the
/// CRC could not be repaired, or if a CRC-valid DF11/17/18 message names a
/// reserved (invalid) ICAO address in its payload.
pub fn demodulate(
    interp: &InterpBuffer,
    candidate: Candidate,
    directory: &mut IcaoDirectory,
    config: &DecoderConfig,
) -> Option<DecodedMessage> {
    let mut hard = extract_hard_bits(interp, &candidate);

    let (result, correction) = crc::check_and_correct(&mut hard, directory, config)?;

    match correction {
        Correction::Clean => {}
        Correction::SingleBit(b) => tracing::debug!(bit = b, "CRC CORRECTED"),
        Correction::DfBit(b) => tracing::debug!(bit = b, "CRC CORRECTED"),
        Correction::TwoBit(i, j) => tracing::debug!(bits = ?(i, j), "CRC CORRECTED"),
    }

    // A Step 2 correction may have flipped `hard[0]` itself, so the final
    // message length is only known for certain now that correction is done.
    let m = if hard[0] == 1 {
        MESSAGE_BITS_MAX
    } else {
        crate::types::MESSAGE_BITS_SHORT
    };

    let icao = if result.icao_in_message {
        let payload_icao = extract_payload_icao(&hard[..m]);
        if is_reserved(payload_icao) {
            tracing::warn!(
                icao = format!("{:06x}", payload_icao),
                "received valid message containing invalid ICAO number"
            );
            return None;
        }
        if directory.add(payload_icao).is_err() {
            return None;
        }
        payload_icao
    } else {
        debug_assert!(matches!(directory.lookup(result.remainder), Lookup::Hit));
        result.remainder
    };

    Some(DecodedMessage {
        sample_start: candidate.sample_start,
        filter_no: candidate.filter_no,
        bits: m,
        icao,
        payload_nibbles: pack_nibbles(&hard[..m - 24]),
    })
}
