//! Audio analysis layer
//!
//! Turns a decoded WAV file into a mono waveform, a one-shot spectrum and a
//! spectrogram. Products are delivered one by one through [`AnalysisSink`]
//! so a viewer can draw the waveform before the FFT work finishes.

mod analyzer;
pub mod config;
pub mod downmix;
pub mod spectral;
mod traits;

pub use analyzer::{
    reanalyze_around_position, reanalyze_around_position_with, spawn_analysis, Analyzer,
};
pub use config::{AnalysisConfig, SpectrogramOptions, SpectrumOptions, WindowMode};
pub use spectral::{compute_spectrogram, compute_spectrum};
pub use traits::{AnalysisEvent, AnalysisReport, AnalysisSink};
