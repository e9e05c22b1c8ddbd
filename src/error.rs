//! Error types for decoding and analysis
//!
//! Every failure surfaces through one of these enums. `Display` strings are
//! meant to be shown to the user as-is.

use std::path::PathBuf;
use thiserror::Error;

/// Structural problems found while decoding a RIFF/WAVE buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("file is not a RIFF container")]
    NotRiff,

    #[error("RIFF container is not a WAVE file")]
    NotWave,

    #[error("no 'fmt ' chunk found")]
    FmtChunkMissing,

    #[error("unsupported audio format {0:#06x} (only PCM is supported)")]
    UnsupportedFormat(u16),

    #[error("unsupported bit depth: {0} bits per sample (8 and 16 are supported)")]
    UnsupportedBitDepth(u16),

    #[error("invalid channel count: {0}")]
    InvalidChannelCount(u16),

    #[error("no 'data' chunk found")]
    DataChunkMissing,

    #[error("chunk header truncated at offset {offset}")]
    TruncatedHeader { offset: usize },

    #[error("chunk body truncated at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedChunk {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Failures of the FFT stage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpectralError {
    #[error("failed to initialise FFT: {reason}")]
    FftInitFailure { reason: String },
}

/// Any failure of the full analysis pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Spectral(#[from] SpectralError),
}
