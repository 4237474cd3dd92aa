use crate::audio::constants::{MAX_FFT_ORDER, MIN_FFT_ORDER};
use crate::error::{AnalyzerError, Result};
use libm::log2f;

/// Log-frequency axis for the spectrum display
///
/// One entry per bin below Nyquist: `axis[0] = 0` (DC is never displayed) and
/// `axis[bin] = log2(bin / fft_size * sample_rate)`, so equal distances on the
/// axis are equal musical intervals. Bins below 1 Hz (large FFTs at low rates)
/// are clamped to 0 so the axis never dips under `axis[0]`. The axis is rebuilt
/// as a whole whenever the sample rate changes.
#[derive(Debug, Clone)]
pub struct SpectralScale {
    fft_size: usize,
    sample_rate: f32,
    axis: Vec<f32>,
}

impl SpectralScale {
    pub fn new(fft_size: usize, sample_rate: f32) -> Result<Self> {
        if !fft_size.is_power_of_two() {
            return Err(AnalyzerError::WindowSizeNotPowerOfTwo(fft_size));
        }
        let order = fft_size.trailing_zeros();
        if !(MIN_FFT_ORDER..=MAX_FFT_ORDER).contains(&order) {
            return Err(AnalyzerError::FftOrderOutOfRange {
                order,
                min: MIN_FFT_ORDER,
                max: MAX_FFT_ORDER,
            });
        }
        validate_sample_rate(sample_rate)?;

        Ok(Self {
            fft_size,
            sample_rate,
            axis: build_axis(fft_size, sample_rate),
        })
    }

    /// Recompute the axis for a new sample rate
    ///
    /// An invalid rate leaves the current axis untouched.
    pub fn remap(&mut self, sample_rate: f32) -> Result<()> {
        if let Err(err) = validate_sample_rate(sample_rate) {
            log::warn!("Ignoring frequency axis remap: {err}");
            return Err(err);
        }

        // Built off to the side and swapped in, never patched entry by entry
        self.axis = build_axis(self.fft_size, sample_rate);
        self.sample_rate = sample_rate;

        log::info!(
            "Remapped frequency axis for {} Hz, top bin at {:.1} Hz",
            sample_rate,
            self.bin_to_frequency(self.axis.len() - 1)
        );
        Ok(())
    }

    pub fn axis(&self) -> &[f32] {
        &self.axis
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of axis entries (fft_size / 2)
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    /// Largest axis value, used to normalise horizontal positions
    pub fn max_freq(&self) -> f32 {
        self.axis[self.axis.len() - 1]
    }

    /// Horizontal position of a bin as a fraction of `max_freq`, within 0.0..=1.0
    pub fn position(&self, bin: usize) -> f32 {
        let max_freq = self.max_freq();
        match self.axis.get(bin) {
            Some(&value) if max_freq > 0.0 => (value / max_freq).clamp(0.0, 1.0),
            Some(_) => 0.0,
            None => 1.0,
        }
    }

    /// Centre frequency of a bin in Hz
    pub fn bin_to_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate / self.fft_size as f32
    }

    /// Nearest bin for a frequency in Hz, clamped to the Nyquist bin
    pub fn frequency_to_bin(&self, frequency_hz: f32) -> usize {
        let bin = (frequency_hz.max(0.0) * self.fft_size as f32 / self.sample_rate).round();
        (bin as usize).min(self.fft_size / 2)
    }

    /// Width of one bin in Hz
    pub fn bin_width(&self) -> f32 {
        self.sample_rate / self.fft_size as f32
    }
}

fn validate_sample_rate(sample_rate: f32) -> Result<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(AnalyzerError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

fn build_axis(fft_size: usize, sample_rate: f32) -> Vec<f32> {
    let size = fft_size / 2;
    let mut axis = vec![0.0; size];
    for (bin, value) in axis.iter_mut().enumerate().skip(1) {
        *value = log2f(bin as f32 / fft_size as f32 * sample_rate).max(0.0);
    }
    axis
}
