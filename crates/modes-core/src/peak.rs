//! Preamble peak selection.
//!
//! Scans the per-phase correlation scores in chronological sample order and
//! collapses each contiguous run above threshold into a single candidate:
//! the argmax over both sample index and phase.

use crate::types::{Candidate, MESSAGE_BITS_MAX, N_FILTERS, PREAMBLE_SAMPLES, PROCESS_BLOCK_SIZE};

/// A candidate is only handed to the demodulator if a full maximum-length
/// message plus preamble fits before the end of the block; otherwise the
/// frame would straddle the block boundary and is dropped by design.
fn fits_in_block(sample_start: usize) -> bool {
    sample_start + PREAMBLE_SAMPLES + 2 * MESSAGE_BITS_MAX <= PROCESS_BLOCK_SIZE
}

/// Scan `score[phase][0..PROCESS_BLOCK_SIZE)` for above-threshold runs,
/// calling `on_candidate` once per run with its argmax `(phase, sample)`.
/// Runs that would straddle the end of the block are dropped silently
/// rather than offered to `on_candidate`.
///
/// This mirrors the original's single pass: a running maximum is tracked
/// while any phase at the current sample exceeds `threshold`; the first
/// sample where none do closes out the run.
pub fn scan<F>(score: &[Vec<f32>; N_FILTERS], threshold: f32, mut on_candidate: F)
where
    F: FnMut(Candidate) -> usize,
{
    let mut max_corr = threshold;
    let mut max_i = 0usize;
    let mut max_j = 0usize;
    let mut have_candidate = false;

    let mut j = 0usize;
    while j < PROCESS_BLOCK_SIZE {
        let mut any_above = false;
        for i in 0..N_FILTERS {
            let v = score[i][j];
            if v > threshold {
                any_above = true;
                if v > max_corr || !have_candidate {
                    max_corr = v;
                    max_i = i;
                    max_j = j;
                    have_candidate = true;
                }
            }
        }

        if !any_above && have_candidate {
            have_candidate = false;
            max_corr = threshold;
            if fits_in_block(max_j) {
                let consumed = on_candidate(Candidate {
                    filter_no: max_i,
                    sample_start: max_j,
                });
                if consumed > 0 {
                    j = max_j + consumed;
                    continue;
                }
            }
        }

        j += 1;
    }

    if have_candidate && fits_in_block(max_j) {
        on_candidate(Candidate {
            filter_no: max_i,
            sample_start: max_j,
        });
    }
}
