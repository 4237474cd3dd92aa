pub mod analyzer;
pub mod channel_analyzer;
pub mod config;
pub mod constants;
pub mod decibel;
pub mod fft_unit;
pub mod frequency_scale;
pub mod mixer;
pub mod processor;
pub mod spectrum_frame;
pub mod window_functions;
