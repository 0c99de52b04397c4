//! Fractional-delay interpolation.
//!
//! For each phase of the filter bank, convolves the block's real/imaginary
//! sample arrays with that phase's FIR and stores the squared magnitude of
//! the result. Only `[0, PROCESS_BLOCK_SIZE)` of the output is written per
//! call; the trailing `PREAMBLE_SAMPLES` guard entries are left at whatever
//! value the caller initialised them to (see [`crate::block::InterpBuffer`]),
//! matching the original receiver where that tail is never recomputed.

use crate::filters::FilterBank;
use crate::types::{FILTER_LEN, PROCESS_BLOCK_SIZE};

/// Apply phase `i`'s FIR to `re`/`im` (each at least `PROCESS_BLOCK_SIZE +
/// FILTER_LEN` long) and write squared magnitudes into `mag[0..PROCESS_BLOCK_SIZE)`.
///
/// Structured as a plain nested loop over contiguous slices so a competent
/// compiler can autovectorize the inner accumulation.
pub fn apply_phase(filters: &FilterBank, phase: usize, re: &[f32], im: &[f32], mag: &mut [f32]) {
    let h = filters.phase(phase);

    for j in 0..PROCESS_BLOCK_SIZE {
        let re_win = &re[j..j + FILTER_LEN];
        let im_win = &im[j..j + FILTER_LEN];

        let mut acc_re = 0.0f32;
        let mut acc_im = 0.0f32;
        for k in 0..FILTER_LEN {
            acc_re += re_win[k] * h[k];
            acc_im += im_win[k] * h[k];
        }

        mag[j] = acc_re * acc_re + acc_im * acc_im;
    }
}
