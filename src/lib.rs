//! Streaming spectrum analysis for a dual-channel dry/wet mixer.
//!
//! The audio thread pushes every sample of both channels through a
//! [`DryWetMixer`]; each mixer mirrors its weighted dry and wet taps into one
//! [`SharedAnalyzer`]. Per channel, two [`FftUnit`]s (dry, wet) accumulate
//! samples, transform every hop and, once both sides are fresh, publish a
//! [`SpectrumFrame`] in dB with log-frequency display points. The renderer reads
//! frames through a [`FrameConsumer`] without ever blocking the audio thread.
//!
//! ```no_run
//! use dual_mixer_spectrum::{AnalyzerConfig, DualMixerProcessor, SharedAnalyzer};
//!
//! let config = AnalyzerConfig::default();
//! let (analyzer, [mut left_frames, _right_frames]) = SharedAnalyzer::from_config(config)?;
//! let mut processor = DualMixerProcessor::new(analyzer, 512);
//! processor.prepare(44_100.0)?;
//! processor.set_proportion(0.5);
//!
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! processor.process(&mut [&mut left[..], &mut right[..]], 2);
//!
//! if let Some(frame) = left_frames.try_recv() {
//!     for point in &frame.points {
//!         let _ = (point.x, point.dry_db, point.wet_db_stacked);
//!     }
//! }
//! # Ok::<(), dual_mixer_spectrum::AnalyzerError>(())
//! ```

pub mod audio;
pub mod error;

pub use audio::analyzer::{DualChannelSpectrumAnalyzer, SharedAnalyzer};
pub use audio::channel_analyzer::ChannelAnalyzer;
pub use audio::config::AnalyzerConfig;
pub use audio::decibel::DecibelConverter;
pub use audio::fft_unit::FftUnit;
pub use audio::frequency_scale::SpectralScale;
pub use audio::mixer::DryWetMixer;
pub use audio::processor::DualMixerProcessor;
pub use audio::spectrum_frame::{
    Channel, FrameConsumer, FrameStats, SignalRole, SpectrumFrame, SpectrumPoint,
};
pub use audio::window_functions::WindowType;
pub use error::{AnalyzerError, Result};
