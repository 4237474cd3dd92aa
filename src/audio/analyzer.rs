use crate::audio::channel_analyzer::ChannelAnalyzer;
use crate::audio::config::AnalyzerConfig;
use crate::audio::frequency_scale::SpectralScale;
use crate::audio::spectrum_frame::{Channel, FrameConsumer, SignalRole};
use crate::error::Result;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

/// Stereo dry/wet spectrum analyser
///
/// Owns one [`ChannelAnalyzer`] per channel and the frequency axis they share.
/// The axis is created with the configured default sample rate and only changes
/// through [`DualChannelSpectrumAnalyzer::set_sample_rate`].
pub struct DualChannelSpectrumAnalyzer {
    config: AnalyzerConfig,
    channels: [ChannelAnalyzer; 2],
    scale: SpectralScale,
}

impl DualChannelSpectrumAnalyzer {
    /// Create a new analyser and its frame consumers
    /// Returns (analyser for the audio thread, [left, right] consumers for the renderer)
    pub fn new(config: AnalyzerConfig) -> Result<(Self, [FrameConsumer; 2])> {
        config.validate()?;

        let scale = SpectralScale::new(config.window_size(), config.default_sample_rate)?;
        let (left, left_frames) = ChannelAnalyzer::new(Channel::Left, &config);
        let (right, right_frames) = ChannelAnalyzer::new(Channel::Right, &config);

        log::info!(
            "Spectrum analyzer ready: {} point FFT, hop {} ({:.0}% overlap), floor {} dB",
            config.window_size(),
            config.hop_size(),
            config.overlap_percent(),
            config.floor_db
        );

        let analyzer = Self {
            config,
            channels: [left, right],
            scale,
        };

        Ok((analyzer, [left_frames, right_frames]))
    }

    /// Route one sample to a channel's dry or wet tap
    #[inline]
    pub fn inject_sample(&mut self, sample: f32, channel: Channel, role: SignalRole) {
        self.channels[channel.index()].inject_sample(sample, role, &self.scale);
    }

    /// Announce the stream's sample rate; the axis is only rebuilt when it changes
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        if sample_rate == self.scale.sample_rate() {
            return Ok(());
        }
        self.scale.remap(sample_rate)
    }

    pub fn sample_rate(&self) -> f32 {
        self.scale.sample_rate()
    }

    pub fn scale(&self) -> &SpectralScale {
        &self.scale
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn channel(&self, channel: Channel) -> &ChannelAnalyzer {
        &self.channels[channel.index()]
    }
}

/// Reference-counted handle to one analyser shared by several mixers
///
/// The analyser lives as long as the last handle. The audio thread only ever
/// calls [`SharedAnalyzer::try_lock`], so it can skip a block but never wait.
#[derive(Clone)]
pub struct SharedAnalyzer {
    inner: Arc<Mutex<DualChannelSpectrumAnalyzer>>,
}

impl SharedAnalyzer {
    pub fn new(analyzer: DualChannelSpectrumAnalyzer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(analyzer)),
        }
    }

    /// Build the analyser from a config and wrap it
    pub fn from_config(config: AnalyzerConfig) -> Result<(Self, [FrameConsumer; 2])> {
        let (analyzer, consumers) = DualChannelSpectrumAnalyzer::new(config)?;
        Ok((Self::new(analyzer), consumers))
    }

    /// Non-blocking access for the audio thread
    pub fn try_lock(&self) -> Option<MutexGuard<'_, DualChannelSpectrumAnalyzer>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(guard),
            // A panic elsewhere does not invalidate the analyser state
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Blocking access for setup and control paths, never for the audio callback
    pub fn lock(&self) -> MutexGuard<'_, DualChannelSpectrumAnalyzer> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Forward the stream's sample rate (control path)
    pub fn set_sample_rate(&self, sample_rate: f32) -> Result<()> {
        self.lock().set_sample_rate(sample_rate)
    }

    /// Number of live handles
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::constants::MAX_FFT_ORDER;
    use crate::error::AnalyzerError;

    fn small_config() -> AnalyzerConfig {
        AnalyzerConfig::from_sizes(128, 64).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = AnalyzerConfig::default().with_fft_order(2);
        assert!(matches!(
            DualChannelSpectrumAnalyzer::new(config),
            Err(AnalyzerError::FftOrderOutOfRange { .. })
        ));
    }

    #[test]
    fn test_routes_by_channel_and_role() {
        let (mut analyzer, [mut left, mut right]) =
            DualChannelSpectrumAnalyzer::new(small_config()).unwrap();

        for _ in 0..64 {
            analyzer.inject_sample(0.5, Channel::Right, SignalRole::Dry);
            analyzer.inject_sample(0.5, Channel::Right, SignalRole::Wet);
        }

        assert_eq!(analyzer.channel(Channel::Right).frames_generated(), 1);
        assert_eq!(analyzer.channel(Channel::Left).frames_generated(), 0);
        assert!(left.try_recv().is_none());
        assert_eq!(right.try_recv().map(|f| f.channel), Some(Channel::Right));

        let left_dry = analyzer.channel(Channel::Left).unit(SignalRole::Dry);
        assert_eq!(left_dry.nyquist_cursor(), 0);
    }

    #[test]
    fn test_set_sample_rate_remaps_once() {
        let (mut analyzer, _consumers) = DualChannelSpectrumAnalyzer::new(small_config()).unwrap();
        assert_eq!(analyzer.sample_rate(), 48_000.0);

        analyzer.set_sample_rate(44_100.0).unwrap();
        assert_eq!(analyzer.sample_rate(), 44_100.0);
        assert!(analyzer.set_sample_rate(44_100.0).is_ok());

        assert!(analyzer.set_sample_rate(0.0).is_err());
        assert_eq!(analyzer.sample_rate(), 44_100.0);
    }

    #[test]
    fn test_frames_carry_current_sample_rate() {
        let (mut analyzer, [mut left, _]) = DualChannelSpectrumAnalyzer::new(small_config()).unwrap();
        analyzer.set_sample_rate(96_000.0).unwrap();

        for _ in 0..64 {
            analyzer.inject_sample(0.1, Channel::Left, SignalRole::Dry);
            analyzer.inject_sample(0.1, Channel::Left, SignalRole::Wet);
        }

        let frame = left.try_recv().unwrap();
        assert_eq!(frame.sample_rate, 96_000.0);
        let first = frame.points[0];
        assert_eq!(first.x, analyzer.scale().position(first.bin));
    }

    #[test]
    fn test_display_points_stay_in_range_at_largest_order() {
        let config = AnalyzerConfig::default()
            .with_fft_order(MAX_FFT_ORDER)
            .with_default_sample_rate(44_100.0);
        let (mut analyzer, [mut left, _]) = DualChannelSpectrumAnalyzer::new(config).unwrap();

        for i in 0..config.hop_size() {
            let sample = if i % 2 == 0 { 0.25 } else { -0.25 };
            analyzer.inject_sample(sample, Channel::Left, SignalRole::Dry);
            analyzer.inject_sample(sample, Channel::Left, SignalRole::Wet);
        }

        let frame = left.try_recv().unwrap();
        assert_eq!(frame.points[0].bin, 1);
        assert!(frame.points.iter().all(|p| (0.0..=1.0).contains(&p.x)));
        assert!(frame.points.windows(2).all(|pair| pair[1].x >= pair[0].x));
    }

    #[test]
    fn test_shared_handle_counts_and_try_lock() {
        let (shared, _consumers) = SharedAnalyzer::from_config(small_config()).unwrap();
        let second = shared.clone();
        assert_eq!(shared.handle_count(), 2);

        {
            let _guard = shared.lock();
            assert!(second.try_lock().is_none());
        }
        assert!(second.try_lock().is_some());

        drop(second);
        assert_eq!(shared.handle_count(), 1);
    }
}
