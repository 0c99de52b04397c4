//! Top-level per-block pipeline: interpolate, correlate, scan, demodulate.
//!
//! Owns every piece of state that used to be a global in the original
//! receiver (filter bank, buffers, ICAO directory, block counter) so the
//! reader/processor split in the CLI binary has a single object to hand
//! blocks to.

use crate::block::{DetectBuffer, InterpBuffer, SampleBlock};
use crate::config::DecoderConfig;
use crate::correlate::correlate;
use crate::demod::{demodulate, DecodedMessage};
use crate::directory::IcaoDirectory;
use crate::filters::FilterBank;
use crate::interpolate::apply_phase;
use crate::peak;
use crate::types::{Candidate, N_FILTERS};

/// Owns the filter bank, buffers, and ICAO directory, and processes
/// successive blocks of raw I/Q bytes into decoded messages.
pub struct Processor {
    filters: FilterBank,
    block: SampleBlock,
    interp: InterpBuffer,
    detect: DetectBuffer,
    directory: IcaoDirectory,
    config: DecoderConfig,
    block_no: u64,
}

impl Processor {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            filters: FilterBank::new(),
            block: SampleBlock::new(),
            interp: InterpBuffer::new(),
            detect: DetectBuffer::new(),
            directory: IcaoDirectory::new(),
            config,
            block_no: 0,
        }
    }

    pub fn directory(&self) -> &IcaoDirectory {
        &self.directory
    }

    pub fn block_no(&self) -> u64 {
        self.block_no
    }

    /// Run the full pipeline over one block of raw I/Q bytes (length
    /// `2 * PROCESS_BLOCK_SIZE`), calling `on_message` for each decode in
    /// chronological order. Advances the block counter on return.
    pub fn process_block(&mut self, raw: &[u8], mut on_message: impl FnMut(u64, &DecodedMessage)) {
        self.block.load(raw);

        for i in 0..N_FILTERS {
            apply_phase(&self.filters, i, &self.block.re, &self.block.im, &mut self.interp.mag[i]);
        }
        for i in 0..N_FILTERS {
            correlate(&self.interp.mag[i], &mut self.detect.score[i]);
        }

        let directory = &mut self.directory;
        let interp = &self.interp;
        let config = &self.config;
        let block_no = self.block_no;

        peak::scan(&self.detect.score, config.detect_threshold, |candidate: Candidate| {
            match demodulate(interp, candidate, directory, config) {
                Some(message) => {
                    on_message(block_no, &message);
                    2 * message.bits
                }
                None => 0,
            }
        });

        self.block_no += 1;
    }
}
