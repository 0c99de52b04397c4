//! Mode S squitter signal-processing and frame-recovery pipeline.
//!
//! This crate is the DSP/decoding core: a polyphase fractional-delay filter
//! bank, preamble correlator and peak selector, PPM demodulator, Mode S CRC
//! checker with bit-error correction, and a bounded ICAO address directory.
//! It has no opinion about where raw I/Q bytes come from or where decoded
//! records go — see [`source::BlockSource`] and [`emit::format_record`] for
//! the seams a binary crate fills in.
//!
//! Payload decoding above the downlink-format field (position, velocity,
//! identification) is out of scope; see `modes-cli` for the binary that
//! wires this crate to a live device or capture file.

pub mod block;
pub mod config;
pub mod correlate;
pub mod crc;
pub mod demod;
pub mod directory;
pub mod emit;
pub mod filters;
pub mod interpolate;
pub mod peak;
pub mod processor;
pub mod source;
pub mod types;

pub use config::DecoderConfig;
pub use demod::DecodedMessage;
pub use directory::IcaoDirectory;
pub use processor::Processor;
pub use source::{BlockSource, FileSource, SourceError, SourceEvent};
