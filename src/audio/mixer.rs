use crate::audio::analyzer::SharedAnalyzer;
use crate::audio::spectrum_frame::{Channel, SignalRole};
use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Per-channel dry/wet mixer that mirrors both taps into the shared analyser
///
/// `out = (1 - p) * dry + p * wet`. The weighted dry and wet contributions are
/// what the analyser sees, so its two curves always add up to the output.
/// Proportion changes take effect at the next block without any ramp.
pub struct DryWetMixer {
    channel: Channel,
    /// Mix proportion 0.0 (all dry) ..= 1.0 (all wet), shared with the control thread
    proportion: Arc<AtomicF32>,
    analyzer: Option<SharedAnalyzer>,
    /// Blocks mixed without analysis because the analyser was busy
    skipped_blocks: Arc<AtomicU64>,
}

impl DryWetMixer {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            proportion: Arc::new(AtomicF32::new(0.0)),
            analyzer: None,
            skipped_blocks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_analyzer(channel: Channel, analyzer: SharedAnalyzer) -> Self {
        let mut mixer = Self::new(channel);
        mixer.attach_analyzer(analyzer);
        mixer
    }

    pub fn attach_analyzer(&mut self, analyzer: SharedAnalyzer) {
        self.analyzer = Some(analyzer);
    }

    pub fn detach_analyzer(&mut self) -> Option<SharedAnalyzer> {
        self.analyzer.take()
    }

    pub fn analyzer(&self) -> Option<&SharedAnalyzer> {
        self.analyzer.as_ref()
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Set the mix proportion, clamped to 0.0..=1.0; NaN is ignored
    pub fn set_proportion(&self, proportion: f32) {
        if proportion.is_nan() {
            return;
        }
        self.proportion
            .store(proportion.clamp(0.0, 1.0), Ordering::Relaxed);
    }

    pub fn proportion(&self) -> f32 {
        self.proportion.load(Ordering::Relaxed)
    }

    /// Shared proportion for a UI or automation thread
    pub fn proportion_handle(&self) -> Arc<AtomicF32> {
        self.proportion.clone()
    }

    pub fn skipped_blocks(&self) -> u64 {
        self.skipped_blocks.load(Ordering::Relaxed)
    }

    /// Mix `dry` into `wet` in place, mirroring both weighted taps into the analyser
    ///
    /// Processes `min(dry.len(), wet.len())` samples. Called from the audio thread:
    /// no allocation, no blocking.
    pub fn process_buffer(&mut self, dry: &[f32], wet: &mut [f32]) {
        let proportion = self.proportion.load(Ordering::Relaxed);
        let dry_gain = 1.0 - proportion;

        let mut analyzer = match &self.analyzer {
            Some(shared) => {
                let guard = shared.try_lock();
                if guard.is_none() {
                    self.skipped_blocks.fetch_add(1, Ordering::Relaxed);
                }
                guard
            }
            None => None,
        };

        for (&dry_sample, wet_sample) in dry.iter().zip(wet.iter_mut()) {
            let dry_contribution = dry_gain * dry_sample;
            let wet_contribution = proportion * *wet_sample;

            if let Some(analyzer) = analyzer.as_mut() {
                analyzer.inject_sample(dry_contribution, self.channel, SignalRole::Dry);
                analyzer.inject_sample(wet_contribution, self.channel, SignalRole::Wet);
            }

            *wet_sample = dry_contribution + wet_contribution;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::config::AnalyzerConfig;

    #[test]
    fn test_mixing_law() {
        let mut mixer = DryWetMixer::new(Channel::Left);

        mixer.set_proportion(0.5);
        let mut wet = [0.0];
        mixer.process_buffer(&[1.0], &mut wet);
        assert_eq!(wet[0], 0.5);

        let dry = [0.3, -0.7, 1.0, 0.0];
        let original_wet = [0.9, 0.2, -0.4, 0.6];

        mixer.set_proportion(0.0);
        let mut wet = original_wet;
        mixer.process_buffer(&dry, &mut wet);
        assert_eq!(wet, dry);

        mixer.set_proportion(1.0);
        let mut wet = original_wet;
        mixer.process_buffer(&dry, &mut wet);
        assert_eq!(wet, original_wet);
    }

    #[test]
    fn test_set_proportion_clamps() {
        let mixer = DryWetMixer::new(Channel::Right);
        mixer.set_proportion(1.5);
        assert_eq!(mixer.proportion(), 1.0);
        mixer.set_proportion(-0.2);
        assert_eq!(mixer.proportion(), 0.0);
        mixer.set_proportion(0.25);
        mixer.set_proportion(f32::NAN);
        assert_eq!(mixer.proportion(), 0.25);

        mixer.proportion_handle().store(0.75, Ordering::Relaxed);
        assert_eq!(mixer.proportion(), 0.75);
    }

    #[test]
    fn test_uneven_slices_process_shortest() {
        let mut mixer = DryWetMixer::new(Channel::Left);
        mixer.set_proportion(0.0);
        let mut wet = [5.0, 5.0, 5.0];
        mixer.process_buffer(&[1.0, 2.0], &mut wet);
        assert_eq!(wet, [1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_taps_reach_the_analyzer() {
        let config = AnalyzerConfig::from_sizes(64, 64).unwrap();
        let (shared, [mut left, mut right]) = SharedAnalyzer::from_config(config).unwrap();
        let mut mixer = DryWetMixer::with_analyzer(Channel::Left, shared.clone());
        mixer.set_proportion(0.5);

        let dry = vec![1.0; 64];
        let mut wet = vec![1.0; 64];
        mixer.process_buffer(&dry, &mut wet);

        assert!(right.try_recv().is_none());
        let frame = left.try_recv().unwrap();
        // Both taps carry 0.5 of a DC signal: -6 dB at bin 0 on each side
        assert!((frame.db_dry[0] + 6.02).abs() < 0.05);
        assert!((frame.db_wet[0] + 6.02).abs() < 0.05);
        assert_eq!(mixer.skipped_blocks(), 0);
    }

    #[test]
    fn test_busy_analyzer_skips_analysis_not_mixing() {
        let config = AnalyzerConfig::from_sizes(64, 64).unwrap();
        let (shared, _consumers) = SharedAnalyzer::from_config(config).unwrap();
        let mut mixer = DryWetMixer::with_analyzer(Channel::Left, shared.clone());
        mixer.set_proportion(0.5);

        let guard = shared.lock();
        let mut wet = [0.0; 4];
        mixer.process_buffer(&[1.0; 4], &mut wet);
        assert_eq!(wet, [0.5; 4]);
        assert_eq!(mixer.skipped_blocks(), 1);
        assert_eq!(guard.channel(Channel::Left).unit(SignalRole::Dry).nyquist_cursor(), 0);
    }

    #[test]
    fn test_detach_analyzer() {
        let config = AnalyzerConfig::from_sizes(64, 64).unwrap();
        let (shared, _consumers) = SharedAnalyzer::from_config(config).unwrap();
        let mut mixer = DryWetMixer::with_analyzer(Channel::Right, shared.clone());
        assert_eq!(shared.handle_count(), 2);

        assert!(mixer.detach_analyzer().is_some());
        assert!(mixer.analyzer().is_none());
        assert_eq!(shared.handle_count(), 1);

        let mut wet = [1.0];
        mixer.process_buffer(&[0.0], &mut wet);
        assert_eq!(wet, [0.0]);
    }
}
