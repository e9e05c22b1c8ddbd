//! RIFF/WAVE reader
//!
//! Parses canonical little-endian WAV files holding uncompressed PCM.
//! Only 8-bit unsigned and 16-bit signed samples are supported; anything
//! else is rejected with a specific [`DecodeError`](crate::error::DecodeError).

mod chunk;
mod decoder;

pub use chunk::{ChunkHeader, ChunkReader, CHUNK_HEADER_SIZE};
pub use decoder::{
    decode, parse, DecodedWav, FormatChunk, SampleFormat, WavLayout, WAVE_FORMAT_PCM,
};
