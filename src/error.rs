use thiserror::Error;

/// Construction-time failures of the analyser pipeline
///
/// The per-sample path never returns errors; everything that can be wrong is
/// rejected here, before any buffer is allocated.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("FFT order {order} is outside the supported range {min}..={max}")]
    FftOrderOutOfRange { order: u32, min: u32, max: u32 },

    #[error("window size {0} is not a power of two")]
    WindowSizeNotPowerOfTwo(usize),

    #[error("hop size {hop} must be a power-of-two fraction of the window size {window}")]
    InvalidHopSize { hop: usize, window: usize },

    #[error("overlap order {overlap_order} leaves no samples per hop with FFT order {fft_order}")]
    OverlapTooLarge { overlap_order: u32, fft_order: u32 },

    #[error("dB floor must be finite and negative, got {0}")]
    InvalidFloor(f32),

    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("failed to read analyzer config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse analyzer config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
