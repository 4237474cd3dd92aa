use crate::audio::constants::{
    self, DEFAULT_FFT_ORDER, DEFAULT_FLOOR_DB, DEFAULT_OVERLAP_ORDER, DEFAULT_SAMPLE_RATE,
    MAX_FFT_ORDER, MIN_FFT_ORDER,
};
use crate::audio::window_functions::WindowType;
use crate::error::{AnalyzerError, Result};
use serde::Deserialize;
use std::path::Path;

/// Analyser configuration, fixed for the lifetime of an analyser
///
/// ```toml
/// fft_order = 11
/// overlap_order = 2
/// floor_db = -144.0
/// window = "blackman"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Window size is 2^fft_order samples
    pub fft_order: u32,
    /// Hop size is window / 2^overlap_order samples
    pub overlap_order: u32,
    /// Lowest dB value any spectrum bin can take
    pub floor_db: f32,
    /// Sample rate used for the frequency axis until the host announces one
    pub default_sample_rate: f32,
    /// Analysis window applied before each transform
    pub window: WindowType,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_order: DEFAULT_FFT_ORDER,
            overlap_order: DEFAULT_OVERLAP_ORDER,
            floor_db: DEFAULT_FLOOR_DB,
            default_sample_rate: DEFAULT_SAMPLE_RATE,
            window: WindowType::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Build a config from explicit window and hop sizes
    pub fn from_sizes(window_size: usize, hop_size: usize) -> Result<Self> {
        if !window_size.is_power_of_two() {
            return Err(AnalyzerError::WindowSizeNotPowerOfTwo(window_size));
        }
        if hop_size == 0 || hop_size > window_size || !hop_size.is_power_of_two() {
            return Err(AnalyzerError::InvalidHopSize {
                hop: hop_size,
                window: window_size,
            });
        }

        let config = Self {
            fft_order: window_size.trailing_zeros(),
            overlap_order: (window_size / hop_size).trailing_zeros(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded analyzer config from {}", path.display());
        Ok(config)
    }

    pub fn with_fft_order(mut self, fft_order: u32) -> Self {
        self.fft_order = fft_order;
        self
    }

    pub fn with_overlap_order(mut self, overlap_order: u32) -> Self {
        self.overlap_order = overlap_order;
        self
    }

    pub fn with_floor_db(mut self, floor_db: f32) -> Self {
        self.floor_db = floor_db;
        self
    }

    pub fn with_default_sample_rate(mut self, sample_rate: f32) -> Self {
        self.default_sample_rate = sample_rate;
        self
    }

    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    /// Reject anything that would corrupt buffers at runtime
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FFT_ORDER..=MAX_FFT_ORDER).contains(&self.fft_order) {
            log::warn!("Rejected FFT order {}", self.fft_order);
            return Err(AnalyzerError::FftOrderOutOfRange {
                order: self.fft_order,
                min: MIN_FFT_ORDER,
                max: MAX_FFT_ORDER,
            });
        }
        // The hop has to stay at least one sample long
        if self.overlap_order >= self.fft_order {
            log::warn!(
                "Rejected overlap order {} for FFT order {}",
                self.overlap_order,
                self.fft_order
            );
            return Err(AnalyzerError::OverlapTooLarge {
                overlap_order: self.overlap_order,
                fft_order: self.fft_order,
            });
        }
        if !self.floor_db.is_finite() || self.floor_db >= 0.0 {
            return Err(AnalyzerError::InvalidFloor(self.floor_db));
        }
        if !self.default_sample_rate.is_finite() || self.default_sample_rate <= 0.0 {
            return Err(AnalyzerError::InvalidSampleRate(self.default_sample_rate));
        }
        Ok(())
    }

    pub fn window_size(&self) -> usize {
        constants::window_size_for_order(self.fft_order)
    }

    pub fn nyquist_size(&self) -> usize {
        self.window_size() >> 1
    }

    pub fn hop_size(&self) -> usize {
        self.window_size() >> self.overlap_order
    }

    pub fn overlap_percent(&self) -> f32 {
        constants::overlap_percent(self.overlap_order)
    }
}
