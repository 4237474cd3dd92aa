use crate::audio::config::AnalyzerConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use triple_buffer::TripleBuffer;

/// Analysed audio channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Left, Channel::Right];

    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Host channel index to channel; anything past the stereo pair is not analysed
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Which side of the mixer a sample was tapped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalRole {
    Dry,
    Wet,
}

/// One display point of a frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpectrumPoint {
    /// FFT bin the point was taken from
    pub bin: usize,
    /// Horizontal position, 0.0..=1.0 of the log-frequency axis
    pub x: f32,
    /// Dry level in dB
    pub dry_db: f32,
    /// Wet level stacked on top of the dry level (dry_db + wet_db)
    pub wet_db_stacked: f32,
}

/// A complete dry/wet spectrum pair, published only when both sides were updated
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFrame {
    pub channel: Channel,
    /// Counts published frames for this channel, starting at 1; 0 means "nothing yet"
    pub sequence: u64,
    /// Sample rate the point positions were computed for
    pub sample_rate: f32,
    /// Dry spectrum in dB, full window length
    pub db_dry: Vec<f32>,
    /// Wet spectrum in dB, full window length
    pub db_wet: Vec<f32>,
    /// Sparse polyline points, one per display bin
    pub points: Vec<SpectrumPoint>,
}

impl SpectrumFrame {
    /// Silent frame with every buffer already at its final size
    pub fn silent(channel: Channel, config: &AnalyzerConfig, num_points: usize) -> Self {
        Self {
            channel,
            sequence: 0,
            sample_rate: config.default_sample_rate,
            db_dry: vec![config.floor_db; config.window_size()],
            db_wet: vec![config.floor_db; config.window_size()],
            points: vec![SpectrumPoint::default(); num_points],
        }
    }

    /// False until the analyser has published at least once
    pub fn is_populated(&self) -> bool {
        self.sequence > 0
    }
}

/// Frame counters, written by the audio thread and readable from anywhere
#[derive(Debug, Default)]
pub struct FrameStats {
    frames_published: AtomicU64,
    frames_overwritten: AtomicU64,
    stalled_transforms: AtomicU64,
}

impl FrameStats {
    pub(crate) fn record_published(&self, overwrote_unread: bool) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
        if overwrote_unread {
            self.frames_overwritten.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn set_stalled_transforms(&self, stalled: u64) {
        self.stalled_transforms.store(stalled, Ordering::Relaxed);
    }

    /// Frames handed to the triple buffer
    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::Relaxed)
    }

    /// Frames replaced before the renderer read them
    pub fn frames_overwritten(&self) -> u64 {
        self.frames_overwritten.load(Ordering::Relaxed)
    }

    /// FFT results (dry + wet) replaced before a frame was generated from them
    pub fn stalled_transforms(&self) -> u64 {
        self.stalled_transforms.load(Ordering::Relaxed)
    }
}

/// Producer half, owned by the channel analyser on the audio thread
pub struct FrameProducer {
    input: triple_buffer::Input<SpectrumFrame>,
    stats: Arc<FrameStats>,
}

impl FrameProducer {
    /// Fill the back buffer in place and publish it (no allocation)
    pub fn publish_with(&mut self, fill: impl FnOnce(&mut SpectrumFrame)) {
        let overwrote_unread = !self.input.consumed();
        fill(self.input.input_buffer_mut());
        self.input.publish();
        self.stats.record_published(overwrote_unread);
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

/// Renderer half: always reads a complete frame, never blocks the audio thread
pub struct FrameConsumer {
    output: triple_buffer::Output<SpectrumFrame>,
    stats: Arc<FrameStats>,
}

impl FrameConsumer {
    /// True if a frame was published since the last read
    pub fn has_new_frame(&self) -> bool {
        self.output.updated()
    }

    /// The newest frame, if one arrived since the last call
    pub fn try_recv(&mut self) -> Option<&SpectrumFrame> {
        if self.output.updated() {
            Some(self.output.read())
        } else {
            None
        }
    }

    /// The newest frame available, old or new
    pub fn latest(&mut self) -> &SpectrumFrame {
        self.output.read()
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

/// Factory function to create a frame channel pair
/// Returns (producer for the audio thread, consumer for the renderer)
pub fn create_frame_channel(initial: SpectrumFrame) -> (FrameProducer, FrameConsumer) {
    let (input, output) = TripleBuffer::new(&initial).split();
    let stats = Arc::new(FrameStats::default());

    (
        FrameProducer {
            input,
            stats: stats.clone(),
        },
        FrameConsumer { output, stats },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_frame() -> SpectrumFrame {
        let config = AnalyzerConfig::from_sizes(64, 64).unwrap();
        SpectrumFrame::silent(Channel::Left, &config, 8)
    }

    #[test]
    fn test_channel_index_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_index(channel.index()), Some(channel));
        }
        assert_eq!(Channel::from_index(2), None);
    }

    #[test]
    fn test_silent_frame_sizes() {
        let frame = silent_frame();
        assert_eq!(frame.db_dry.len(), 64);
        assert_eq!(frame.db_wet.len(), 64);
        assert_eq!(frame.points.len(), 8);
        assert!(!frame.is_populated());
        assert!(frame.db_dry.iter().all(|&db| db == frame.db_dry[0]));
    }

    #[test]
    fn test_consumer_sees_latest_frame_only() {
        let (mut producer, mut consumer) = create_frame_channel(silent_frame());
        assert!(consumer.try_recv().is_none());

        producer.publish_with(|frame| frame.sequence = 1);
        producer.publish_with(|frame| frame.sequence = 2);
        assert!(consumer.has_new_frame());

        let frame = consumer.try_recv().unwrap();
        assert_eq!(frame.sequence, 2);
        assert!(consumer.try_recv().is_none());
        assert_eq!(consumer.latest().sequence, 2);

        assert_eq!(consumer.stats().frames_published(), 2);
        assert_eq!(consumer.stats().frames_overwritten(), 1);
    }

    #[test]
    fn test_read_frames_are_not_counted_as_overwritten() {
        let (mut producer, mut consumer) = create_frame_channel(silent_frame());
        for sequence in 1..=3 {
            producer.publish_with(|frame| frame.sequence = sequence);
            assert_eq!(consumer.try_recv().map(|f| f.sequence), Some(sequence));
        }
        assert_eq!(producer.stats().frames_overwritten(), 0);
    }
}
