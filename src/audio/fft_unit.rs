use crate::audio::config::AnalyzerConfig;
use crate::audio::window_functions::WindowData;
use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Streaming FFT for one signal (one channel, dry or wet)
///
/// Samples are written one at a time into a circular buffer of `buffer_size`.
/// Every `stream_size` samples (the hop) the buffer is unrolled oldest-first,
/// windowed and transformed; the magnitudes land in `output_buffer` and `ready`
/// is raised. A consumer that does not clear `ready` before the next hop simply
/// loses that frame: the newer transform overwrites it and a stall is counted.
///
/// Everything is allocated in [`FftUnit::new`]; [`FftUnit::inject_sample`] is
/// allocation free and safe to call from the audio thread.
pub struct FftUnit {
    /// Pre-planned forward FFT of `buffer_size`
    fft_processor: Arc<dyn RealToComplex<f32>>,
    /// Pre-computed analysis window
    window: WindowData,

    /// Circular buffer of the most recent samples
    input_buffer: Vec<f32>,
    /// Magnitude spectrum of the last completed transform, `buffer_size` long
    output_buffer: Vec<f32>,
    /// Unrolled and windowed copy of `input_buffer` (consumed by the FFT)
    time_domain_buffer: Vec<f32>,
    /// FFT output, `nyquist_size + 1` bins
    frequency_domain_buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,

    /// Write position in `input_buffer`, wraps at `buffer_size`
    nyquist_cursor: usize,
    /// Samples since the last transform, wraps at `stream_size`
    active_cursor: usize,

    buffer_size: usize,
    nyquist_size: usize,
    stream_size: usize,

    ready: bool,
    stalled_transforms: u64,
}

impl FftUnit {
    /// Create a unit sized from an already validated config
    pub fn new(config: &AnalyzerConfig) -> Self {
        let buffer_size = config.window_size();
        let nyquist_size = buffer_size >> 1;
        let stream_size = config.hop_size();

        let mut fft_planner = RealFftPlanner::<f32>::new();
        let fft_processor = fft_planner.plan_fft_forward(buffer_size);
        let frequency_domain_buffer = fft_processor.make_output_vec();
        let scratch = fft_processor.make_scratch_vec();

        log::debug!(
            "FFT unit: buffer {} / nyquist {} / hop {} samples, {:.1}% overlap, {:?} window",
            buffer_size,
            nyquist_size,
            stream_size,
            config.overlap_percent(),
            config.window
        );

        Self {
            fft_processor,
            window: WindowData::new(config.window, buffer_size),
            input_buffer: vec![0.0; buffer_size],
            output_buffer: vec![0.0; buffer_size],
            time_domain_buffer: vec![0.0; buffer_size],
            frequency_domain_buffer,
            scratch,
            nyquist_cursor: 0,
            active_cursor: 0,
            buffer_size,
            nyquist_size,
            stream_size,
            ready: false,
            stalled_transforms: 0,
        }
    }

    /// Append one sample; raises `ready` when this sample completed a hop
    pub fn inject_sample(&mut self, sample: f32) {
        self.input_buffer[self.nyquist_cursor] = sample;
        self.nyquist_cursor += 1;
        self.active_cursor += 1;

        if self.active_cursor >= self.stream_size {
            self.active_cursor = 0;
            self.transform();
        }

        // Wrapping is tied to the window length, not to the hop
        if self.nyquist_cursor >= self.buffer_size {
            self.nyquist_cursor = 0;
        }
    }

    /// Feed a whole slice, sample by sample
    pub fn inject_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.inject_sample(sample);
        }
    }

    fn transform(&mut self) {
        self.copy_from_ring_buffer();
        self.window.apply(&mut self.time_domain_buffer);

        if self
            .fft_processor
            .process_with_scratch(
                &mut self.time_domain_buffer,
                &mut self.frequency_domain_buffer,
                &mut self.scratch,
            )
            .is_err()
        {
            // Buffer lengths are fixed at construction, skip the frame rather than panic
            return;
        }

        self.compute_magnitude_spectrum();

        if self.ready {
            self.stalled_transforms += 1;
        }
        self.ready = true;
    }

    /// Unroll the circular input buffer into the transform buffer, oldest sample first
    fn copy_from_ring_buffer(&mut self) {
        let start = self.nyquist_cursor % self.buffer_size;
        let (newer, older) = self.input_buffer.split_at(start);
        let split = older.len();
        self.time_domain_buffer[..split].copy_from_slice(older);
        self.time_domain_buffer[split..].copy_from_slice(newer);
    }

    /// Single-sided amplitude spectrum, mirrored above Nyquist to fill `buffer_size`
    fn compute_magnitude_spectrum(&mut self) {
        let window_size = self.buffer_size as f32;
        let coherent_gain = self.window.coherent_gain;

        for (bin_idx, complex_bin) in self.frequency_domain_buffer.iter().enumerate() {
            let scaling = if bin_idx == 0 || bin_idx == self.nyquist_size {
                // DC and Nyquist have no negative-frequency twin
                1.0 / window_size
            } else {
                2.0 / window_size
            };
            self.output_buffer[bin_idx] = complex_bin.norm() * scaling / coherent_gain;
        }

        for bin_idx in (self.nyquist_size + 1)..self.buffer_size {
            self.output_buffer[bin_idx] = self.output_buffer[self.buffer_size - bin_idx];
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Clear `ready` once the current spectrum has been taken
    pub fn mark_consumed(&mut self) {
        self.ready = false;
    }

    /// Magnitudes of the last completed transform
    pub fn spectrum(&self) -> &[f32] {
        &self.output_buffer
    }

    /// Owned copy of the last completed transform (allocates)
    pub fn spectrum_snapshot(&self) -> Vec<f32> {
        self.output_buffer.clone()
    }

    /// Copy the last completed transform into `dest` without allocating
    pub fn copy_spectrum_into(&self, dest: &mut [f32]) {
        let len = dest.len().min(self.output_buffer.len());
        dest[..len].copy_from_slice(&self.output_buffer[..len]);
    }

    /// Transforms that replaced a spectrum nobody had consumed yet
    pub fn stalled_transforms(&self) -> u64 {
        self.stalled_transforms
    }

    pub fn nyquist_cursor(&self) -> usize {
        self.nyquist_cursor
    }

    pub fn active_cursor(&self) -> usize {
        self.active_cursor
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn nyquist_size(&self) -> usize {
        self.nyquist_size
    }

    pub fn stream_size(&self) -> usize {
        self.stream_size
    }
}
