use crate::audio::config::AnalyzerConfig;
use crate::audio::constants::DISPLAY_GAP_DOUBLING;
use crate::audio::decibel::DecibelConverter;
use crate::audio::fft_unit::FftUnit;
use crate::audio::frequency_scale::SpectralScale;
use crate::audio::spectrum_frame::{
    create_frame_channel, Channel, FrameConsumer, FrameProducer, SignalRole, SpectrumFrame,
    SpectrumPoint,
};

/// Dry and wet analysis of one audio channel
///
/// Frames are generated only when both FFT units have a fresh spectrum; both
/// ready flags are cleared together, so a published frame never pairs a new dry
/// spectrum with a stale wet one (or the other way round).
pub struct ChannelAnalyzer {
    channel: Channel,
    dry_unit: FftUnit,
    wet_unit: FftUnit,
    decibels: DecibelConverter,

    /// dB buffers of the last generated frame, full window length
    db_dry: Vec<f32>,
    db_wet: Vec<f32>,

    /// Bins shown on the display, dense at the bottom and sparse at the top
    display_bins: Vec<usize>,

    frames: FrameProducer,
    sequence: u64,
}

impl ChannelAnalyzer {
    /// Create the analyser and the renderer's frame consumer
    pub fn new(channel: Channel, config: &AnalyzerConfig) -> (Self, FrameConsumer) {
        let dry_unit = FftUnit::new(config);
        let wet_unit = FftUnit::new(config);
        let display_bins = display_bins(dry_unit.nyquist_size());

        let (frames, consumer) = create_frame_channel(SpectrumFrame::silent(
            channel,
            config,
            display_bins.len(),
        ));

        log::debug!(
            "{:?} channel analyzer: {} display points over {} bins",
            channel,
            display_bins.len(),
            dry_unit.nyquist_size()
        );

        let analyzer = Self {
            channel,
            dry_unit,
            wet_unit,
            decibels: DecibelConverter::new(config.floor_db),
            db_dry: vec![config.floor_db; config.window_size()],
            db_wet: vec![config.floor_db; config.window_size()],
            display_bins,
            frames,
            sequence: 0,
        };

        (analyzer, consumer)
    }

    /// Route one sample to the dry or wet unit and publish a frame once both are ready
    pub fn inject_sample(&mut self, sample: f32, role: SignalRole, scale: &SpectralScale) {
        let unit = match role {
            SignalRole::Dry => &mut self.dry_unit,
            SignalRole::Wet => &mut self.wet_unit,
        };
        unit.inject_sample(sample);

        // A hop just completed: stalls become visible even if the other side lags
        if unit.active_cursor() == 0 {
            self.frames
                .stats()
                .set_stalled_transforms(self.stalled_transforms());
        }

        if self.dry_unit.is_ready() && self.wet_unit.is_ready() {
            self.generate_spectrum(scale);
        }
    }

    fn generate_spectrum(&mut self, scale: &SpectralScale) {
        self.dry_unit.copy_spectrum_into(&mut self.db_dry);
        self.wet_unit.copy_spectrum_into(&mut self.db_wet);

        self.decibels.apply_in_place(&mut self.db_dry);
        self.decibels.apply_in_place(&mut self.db_wet);

        self.dry_unit.mark_consumed();
        self.wet_unit.mark_consumed();

        self.sequence += 1;
        self.publish_frame(scale);
    }

    fn publish_frame(&mut self, scale: &SpectralScale) {
        let channel = self.channel;
        let sequence = self.sequence;
        let db_dry = &self.db_dry;
        let db_wet = &self.db_wet;
        let display_bins = &self.display_bins;

        self.frames.publish_with(|frame| {
            frame.channel = channel;
            frame.sequence = sequence;
            frame.sample_rate = scale.sample_rate();
            frame.db_dry.copy_from_slice(db_dry);
            frame.db_wet.copy_from_slice(db_wet);

            for (point, &bin) in frame.points.iter_mut().zip(display_bins.iter()) {
                let dry_db = db_dry[bin];
                *point = SpectrumPoint {
                    bin,
                    x: scale.position(bin),
                    dry_db,
                    wet_db_stacked: dry_db + db_wet[bin],
                };
            }
        });
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Dry dB buffer of the last generated frame
    pub fn db_dry(&self) -> &[f32] {
        &self.db_dry
    }

    /// Wet dB buffer of the last generated frame
    pub fn db_wet(&self) -> &[f32] {
        &self.db_wet
    }

    pub fn display_bins(&self) -> &[usize] {
        &self.display_bins
    }

    /// FFT results (dry + wet) replaced before they were paired into a frame
    pub fn stalled_transforms(&self) -> u64 {
        self.dry_unit.stalled_transforms() + self.wet_unit.stalled_transforms()
    }

    /// Number of frames generated so far
    pub fn frames_generated(&self) -> u64 {
        self.sequence
    }

    pub fn unit(&self, role: SignalRole) -> &FftUnit {
        match role {
            SignalRole::Dry => &self.dry_unit,
            SignalRole::Wet => &self.wet_unit,
        }
    }
}

/// Bins selected for display below `total`
///
/// Starts at bin 1 (DC is skipped) with a step of one bin and doubles the step
/// after every 32 selections, which thins the high end the way a log axis would.
pub fn display_bins(total: usize) -> Vec<usize> {
    let mut bins = Vec::new();
    let mut bin = 1;
    let mut gap = 1;

    while bin < total {
        bins.push(bin);
        bin += gap;

        if bins.len() % DISPLAY_GAP_DOUBLING == 0 {
            gap *= 2;
        }
    }
    bins
}
