//! Polyphase fractional-delay filter bank.
//!
//! Builds `N_FILTERS` windowed-sinc FIR kernels, one per fractional sample
//! offset `i / N_FILTERS`, evenly spaced across a single sample period. The
//! bank is immutable after construction and shared (read-only) between the
//! interpolator calls that use it.

use crate::types::{FILTER_LEN, N_FILTERS};

/// `N_FILTERS x FILTER_LEN` matrix of real FIR coefficients.
#[derive(Debug, Clone)]
pub struct FilterBank {
    coeffs: [[f32; FILTER_LEN]; N_FILTERS],
}

impl FilterBank {
    /// Build the filter bank once at startup.
    ///
    /// Coefficient `k` of phase `i` is a shifted sinc windowed by a Hann
    /// window whose phase is chosen so the first tap is pushed to the "-1"
    /// position (never exactly zero) while the last tap is always zero, so
    /// every phase keeps `FILTER_LEN` live taps as it slides with `i`.
    pub fn new() -> Self {
        let mut coeffs = [[0.0f32; FILTER_LEN]; N_FILTERS];

        for (i, phase) in coeffs.iter_mut().enumerate() {
            for (k, tap) in phase.iter_mut().enumerate() {
                let frac = i as f64 / N_FILTERS as f64;

                let window = 0.5
                    * (1.0
                        - (2.0 * std::f64::consts::PI * ((k as f64 + 1.0) - frac)
                            / FILTER_LEN as f64)
                            .cos());

                let x_sinc =
                    std::f64::consts::PI * (k as f64 - (FILTER_LEN as f64 / 2.0 - 1.0) - frac);
                let sinc = if x_sinc == 0.0 { 1.0 } else { x_sinc.sin() / x_sinc };

                *tap = (sinc * window) as f32;
            }
        }

        Self { coeffs }
    }

    /// Coefficients for phase `i`, `i in [0, N_FILTERS)`.
    #[inline]
    pub fn phase(&self, i: usize) -> &[f32; FILTER_LEN] {
        &self.coeffs[i]
    }
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new()
    }
}
