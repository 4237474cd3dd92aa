//! Linear-to-dB conversion for spectrum magnitudes
//!
//! Magnitudes coming out of the FFT units are amplitudes. The dB value follows
//! the power convention `10 * log10(amplitude^2)`, evaluated as
//! `20 * log10(|amplitude|)` so tiny amplitudes are not lost to an underflowing
//! square. Every result is clamped to the floor so that silence never produces
//! -inf.

use libm::{log10f, powf};

/// Convert one amplitude to dB, clamped at `floor_db`
#[inline]
pub fn amplitude_to_db(amplitude: f32, floor_db: f32) -> f32 {
    let magnitude = amplitude.abs();

    // Also catches NaN
    if !(magnitude > 0.0) {
        return floor_db;
    }

    let db = 20.0 * log10f(magnitude);
    if db < floor_db {
        floor_db
    } else {
        db
    }
}

/// Inverse of [`amplitude_to_db`] for values above the floor
pub fn db_to_amplitude(db: f32) -> f32 {
    powf(10.0, db / 20.0)
}

/// Map a dB value onto 0.0 (0 dB) .. 1.0 (floor), the vertical fraction a renderer
/// measures from the top edge
pub fn db_to_normalized(db: f32, floor_db: f32) -> f32 {
    (db / floor_db).clamp(0.0, 1.0)
}

/// Stateless converter carrying the configured floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecibelConverter {
    floor_db: f32,
}

impl DecibelConverter {
    pub fn new(floor_db: f32) -> Self {
        Self { floor_db }
    }

    pub fn floor_db(&self) -> f32 {
        self.floor_db
    }

    #[inline]
    pub fn to_db(&self, amplitude: f32) -> f32 {
        amplitude_to_db(amplitude, self.floor_db)
    }

    /// Convert a whole spectrum in place (no allocation)
    pub fn apply_in_place(&self, spectrum: &mut [f32]) {
        for value in spectrum.iter_mut() {
            *value = amplitude_to_db(*value, self.floor_db);
        }
    }
}
