//! Analysis windows for the streaming FFT units
//!
//! Coefficients are generated once per unit at construction; the per-sample
//! path only multiplies by the pre-computed table.

use apodize::{hamming_iter, hanning_iter};
use core::f32::consts::PI;
use libm::cosf;
use serde::Deserialize;

/// Pre-computed window function data for efficient FFT processing
///
/// Holds both the window shape (coefficients) and the compensation factor
/// (coherent_gain) needed to restore correct amplitude measurements.
#[derive(Debug, Clone)]
pub struct WindowData {
    /// Window values [0.0..1.0] multiplied with the time-domain samples
    /// Length matches the FFT size
    pub coefficients: Vec<f32>,

    /// Average window value, used to compensate for amplitude reduction
    /// Typical values: Hann ~0.5, Blackman ~0.42, Rectangular 1.0
    pub coherent_gain: f32,
}

impl WindowData {
    pub fn new(window_type: WindowType, window_size: usize) -> Self {
        let coefficients = window_type.generate(window_size);
        let coherent_gain = coherent_gain(&coefficients);
        Self {
            coefficients,
            coherent_gain,
        }
    }

    /// Multiply `samples` by the window in place
    pub fn apply(&self, samples: &mut [f32]) {
        for (sample, &coeff) in samples.iter_mut().zip(self.coefficients.iter()) {
            *sample *= coeff;
        }
    }
}

/// Window function types for FFT analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Rectangular: No windowing, maximum frequency resolution
    Rectangular,
    /// Hann: Good general-purpose balance
    #[default]
    Hann,
    /// Hamming: Better sidelobe suppression
    Hamming,
    /// Blackman (classic 3-term, 0.42 / 0.5 / 0.08): low sidelobes, wider main lobe
    Blackman,
}

impl WindowType {
    /// Generate window coefficients for this window type
    pub fn generate(self, window_size: usize) -> Vec<f32> {
        match self {
            Self::Rectangular => vec![1.0; window_size],
            Self::Hann => hanning_iter(window_size).map(|w| w as f32).collect(),
            Self::Hamming => hamming_iter(window_size).map(|w| w as f32).collect(),
            Self::Blackman => generate_blackman(window_size),
        }
    }
}

/// Periodic 3-term Blackman window
///
/// apodize only ships the 4-term Blackman-Harris variant.
pub fn generate_blackman(window_size: usize) -> Vec<f32> {
    let window_size_f32 = window_size as f32;

    (0..window_size)
        .map(|i| {
            let position = i as f32 / window_size_f32;
            0.42 - 0.5 * cosf(2.0 * PI * position) + 0.08 * cosf(4.0 * PI * position)
        })
        .collect()
}

/// Mean of the coefficients; 1.0 for an empty table
pub fn coherent_gain(coefficients: &[f32]) -> f32 {
    if coefficients.is_empty() {
        return 1.0;
    }
    coefficients.iter().sum::<f32>() / coefficients.len() as f32
}
