use crate::audio::analyzer::SharedAnalyzer;
use crate::audio::constants::{MAX_BLOCK_SIZE, NUM_CHANNELS};
use crate::audio::mixer::DryWetMixer;
use crate::audio::spectrum_frame::Channel;
use crate::error::Result;

/// Stereo dry/wet stage: captures the dry signal, lets a wet stage process the
/// buffer in place, then mixes both back through the per-channel mixers
///
/// Channel routing follows the input layout:
/// - output channels with no matching input are cleared
/// - mono in, stereo out: the left input is copied to the right channel and
///   both mixers read their dry signal from channel 0
/// - otherwise each channel reads its own dry signal
pub struct DualMixerProcessor {
    mixers: [DryWetMixer; NUM_CHANNELS],
    // Pre-allocated to avoid allocations in the audio thread (real-time constraint)
    dry_scratch: [Vec<f32>; NUM_CHANNELS],
    max_block_size: usize,
    analyzer: SharedAnalyzer,
}

impl DualMixerProcessor {
    pub fn new(analyzer: SharedAnalyzer, max_block_size: usize) -> Self {
        let max_block_size = max_block_size.clamp(1, MAX_BLOCK_SIZE);

        Self {
            mixers: [
                DryWetMixer::with_analyzer(Channel::Left, analyzer.clone()),
                DryWetMixer::with_analyzer(Channel::Right, analyzer.clone()),
            ],
            dry_scratch: [vec![0.0; max_block_size], vec![0.0; max_block_size]],
            max_block_size,
            analyzer,
        }
    }

    /// Stream start: forward the sample rate to the analyser (control path, may block)
    pub fn prepare(&mut self, sample_rate: f32) -> Result<()> {
        log::info!(
            "Preparing dual mixer at {} Hz, max block {} samples",
            sample_rate,
            self.max_block_size
        );
        self.analyzer.set_sample_rate(sample_rate)
    }

    /// Set the same proportion on both mixers
    pub fn set_proportion(&self, proportion: f32) {
        for mixer in &self.mixers {
            mixer.set_proportion(proportion);
        }
    }

    pub fn mixer(&self, channel: Channel) -> &DryWetMixer {
        &self.mixers[channel.index()]
    }

    pub fn analyzer(&self) -> &SharedAnalyzer {
        &self.analyzer
    }

    /// Mix with an identity wet stage
    pub fn process(&mut self, buffer: &mut [&mut [f32]], num_input_channels: usize) {
        self.process_with(buffer, num_input_channels, |_, _| {});
    }

    /// Process one host block
    ///
    /// `wet_stage` is called once per output channel (index, samples) on the routed
    /// signal before mixing. Blocks longer than `max_block_size` are processed in chunks.
    pub fn process_with<F>(
        &mut self,
        buffer: &mut [&mut [f32]],
        num_input_channels: usize,
        mut wet_stage: F,
    ) where
        F: FnMut(usize, &mut [f32]),
    {
        let num_output_channels = buffer.len();
        let num_samples = buffer.iter().map(|channel| channel.len()).min().unwrap_or(0);

        // Outputs without an input may hold garbage
        for channel in buffer.iter_mut().skip(num_input_channels) {
            channel.fill(0.0);
        }

        let mono_to_stereo = num_input_channels == 1 && num_output_channels >= 2;

        let mut start = 0;
        while start < num_samples {
            let end = (start + self.max_block_size).min(num_samples);
            let len = end - start;

            // Copy dry input for all routed channels before anything touches the buffer
            for (channel_idx, scratch) in self.dry_scratch.iter_mut().enumerate() {
                if channel_idx >= num_output_channels {
                    break;
                }
                let source = if mono_to_stereo { 0 } else { channel_idx };
                scratch[..len].copy_from_slice(&buffer[source][start..end]);
            }

            if mono_to_stereo {
                let (left, right) = buffer.split_at_mut(1);
                right[0][start..end].copy_from_slice(&left[0][start..end]);
            }

            for (channel_idx, channel) in buffer.iter_mut().enumerate() {
                let Some(mixer) = self.mixers.get_mut(channel_idx) else {
                    break;
                };
                let wet = &mut channel[start..end];
                wet_stage(channel_idx, wet);
                mixer.process_buffer(&self.dry_scratch[channel_idx][..len], wet);
            }

            start = end;
        }
    }
}
