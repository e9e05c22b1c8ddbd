//! WAV Analyzer - decode and spectral analysis of PCM WAV files
//!
//! This library decodes uncompressed RIFF/WAVE files into a normalized mono
//! waveform and derives a one-shot spectrum and a spectrogram from it.
//! Rendering is left to the caller.

pub mod analysis;
pub mod error;
pub mod live;
pub mod model;
pub mod wav;

pub use analysis::{AnalysisConfig, AnalysisReport, AnalysisSink, Analyzer};
pub use error::{AnalysisError, DecodeError, SpectralError};
