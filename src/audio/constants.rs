/// Analysis defaults shared by the FFT units, the frequency scale and the mixer
/// Every value here can be overridden through `AnalyzerConfig` at construction

/// Default FFT order: 2^11 = 2048 samples, ~23.4Hz resolution at 48kHz
pub const DEFAULT_FFT_ORDER: u32 = 11;

/// Default overlap order: hop = window / 2^1 (50% overlap)
pub const DEFAULT_OVERLAP_ORDER: u32 = 1;

/// Smallest and largest FFT orders accepted by the configuration
pub const MIN_FFT_ORDER: u32 = 4;
pub const MAX_FFT_ORDER: u32 = 16;

/// dB floor for spectrum values, keeps -inf out of the rendering math
pub const DEFAULT_FLOOR_DB: f32 = -192.0;

/// Sample rate assumed until the host announces the real one
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

/// The display step between selected bins doubles after this many selections
pub const DISPLAY_GAP_DOUBLING: usize = 32;

/// Largest block the mixer processor handles in one pass (longer blocks are chunked)
pub const MAX_BLOCK_SIZE: usize = 8192;

/// Number of analysed channels (left, right)
pub const NUM_CHANNELS: usize = 2;

// === HELPER FUNCTIONS ===

/// FFT window size for an order
pub fn window_size_for_order(fft_order: u32) -> usize {
    1usize << fft_order
}

/// Overlap between successive windows in percent (0, 50, 75, ...)
pub fn overlap_percent(overlap_order: u32) -> f32 {
    (1.0 - 1.0 / (1u32 << overlap_order) as f32) * 100.0
}
