//! Data products of the analysis pipeline
//!
//! Every value here is an immutable snapshot created by one decode or
//! analysis call and handed to the caller.

mod metadata;
mod samples;
mod spectrum;

pub use metadata::AudioMetadata;
pub use samples::SampleBuffer;
pub use spectrum::{
    AmplitudeScale, SpectrogramResult, SpectrumPeak, SpectrumResult, DEFAULT_MAX_DB,
    DEFAULT_MIN_DB,
};
