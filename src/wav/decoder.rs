//! RIFF/WAVE PCM decoder
//!
//! Decoding runs in two steps so callers can publish the metadata before the
//! sample data is converted:
//! 1. [`parse`] validates the container and locates the `fmt ` and `data` chunks
//! 2. [`WavLayout::decode_samples`] converts the PCM bytes to a mono buffer
//!
//! [`decode`] does both.

use super::chunk::ChunkReader;
use crate::analysis::downmix::downmix;
use crate::error::DecodeError;
use crate::model::{AudioMetadata, SampleBuffer};

/// RIFF container magic
const RIFF_ID: &[u8; 4] = b"RIFF";
/// WAVE form type
const WAVE_ID: &[u8; 4] = b"WAVE";
/// Format chunk id (note the trailing space)
const FMT_ID: &[u8; 4] = b"fmt ";
/// Sample data chunk id
const DATA_ID: &[u8; 4] = b"data";
/// Size of the fixed PCM fields of the `fmt ` chunk
const FMT_PCM_SIZE: u32 = 16;

/// `audioFormat` code for uncompressed PCM
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Fields of the `fmt ` chunk, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatChunk {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

/// Supported PCM sample encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 8-bit unsigned, centered on 128
    U8,
    /// 16-bit signed little-endian
    I16,
}

impl SampleFormat {
    fn from_bits(bits_per_sample: u16) -> Result<Self, DecodeError> {
        match bits_per_sample {
            8 => Ok(SampleFormat::U8),
            16 => Ok(SampleFormat::I16),
            other => Err(DecodeError::UnsupportedBitDepth(other)),
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::I16 => 2,
        }
    }

    /// Value of one channel sample on the 16-bit scale
    #[inline]
    fn value(&self, bytes: &[u8]) -> f64 {
        match self {
            SampleFormat::U8 => (bytes[0] as i32 - 128) as f64 * 256.0,
            SampleFormat::I16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
        }
    }
}

/// A validated WAV file whose samples have not been converted yet
#[derive(Debug, Clone)]
pub struct WavLayout<'a> {
    pub format: FormatChunk,
    pub sample_format: SampleFormat,
    pub metadata: AudioMetadata,
    /// PCM bytes of the `data` chunk actually present in the buffer
    data: &'a [u8],
}

/// Fully decoded WAV file
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWav {
    pub metadata: AudioMetadata,
    pub samples: SampleBuffer,
}

/// Decode a complete WAV file held in memory
pub fn decode(bytes: &[u8]) -> Result<DecodedWav, DecodeError> {
    let layout = parse(bytes)?;
    let samples = layout.decode_samples();

    Ok(DecodedWav {
        metadata: layout.metadata,
        samples,
    })
}

/// Validate the container and locate the format and data chunks
pub fn parse(bytes: &[u8]) -> Result<WavLayout<'_>, DecodeError> {
    let mut reader = ChunkReader::new(bytes);

    read_riff_header(&mut reader)?;

    let fmt_size = reader
        .find_chunk(FMT_ID)?
        .ok_or(DecodeError::FmtChunkMissing)?;
    let format = read_format_chunk(&mut reader, fmt_size)?;

    if format.audio_format != WAVE_FORMAT_PCM {
        return Err(DecodeError::UnsupportedFormat(format.audio_format));
    }
    if format.num_channels == 0 {
        return Err(DecodeError::InvalidChannelCount(format.num_channels));
    }
    let sample_format = SampleFormat::from_bits(format.bits_per_sample)?;

    let data_byte_size = reader
        .find_chunk(DATA_ID)?
        .ok_or(DecodeError::DataChunkMissing)?;
    let data = reader.read_up_to(data_byte_size as usize);

    if data.len() < data_byte_size as usize {
        log::warn!(
            "data chunk declares {} bytes but only {} are present",
            data_byte_size,
            data.len()
        );
    }

    let frame_bytes = format.num_channels as usize * sample_format.bytes_per_sample();
    if format.block_align as usize != frame_bytes {
        log::debug!(
            "block_align {} differs from computed frame size {}",
            format.block_align,
            frame_bytes
        );
    }

    let metadata = AudioMetadata::new(
        format.sample_rate,
        format.byte_rate,
        format.num_channels,
        format.bits_per_sample,
        format.block_align,
        data_byte_size,
    );

    log::debug!("Parsed WAV header: {}", metadata);

    Ok(WavLayout {
        format,
        sample_format,
        metadata,
        data,
    })
}

impl WavLayout<'_> {
    /// Convert every complete frame to one normalized mono sample
    pub fn decode_samples(&self) -> SampleBuffer {
        let channels = self.format.num_channels;
        let sample_bytes = self.sample_format.bytes_per_sample();
        let frame_bytes = channels as usize * sample_bytes;

        let samples: Vec<f64> = self
            .data
            .chunks_exact(frame_bytes)
            .map(|frame| {
                let sum: f64 = frame
                    .chunks_exact(sample_bytes)
                    .map(|s| self.sample_format.value(s))
                    .sum();
                downmix(sum, channels)
            })
            .collect();

        log::debug!(
            "Decoded {} frames ({} channel(s), {} bits)",
            samples.len(),
            channels,
            self.format.bits_per_sample
        );

        SampleBuffer::new(samples, self.format.sample_rate)
    }
}

fn read_riff_header(reader: &mut ChunkReader<'_>) -> Result<(), DecodeError> {
    match reader.read_bytes(4) {
        Ok(id) if id == RIFF_ID => {}
        _ => return Err(DecodeError::NotRiff),
    }

    // The RIFF size is not checked against the real length
    reader.read_u32_le().map_err(|_| DecodeError::NotWave)?;

    match reader.read_bytes(4) {
        Ok(form) if form == WAVE_ID => Ok(()),
        _ => Err(DecodeError::NotWave),
    }
}

fn read_format_chunk(reader: &mut ChunkReader<'_>, size: u32) -> Result<FormatChunk, DecodeError> {
    if size < FMT_PCM_SIZE {
        return Err(DecodeError::TruncatedChunk {
            offset: reader.position(),
            needed: FMT_PCM_SIZE as usize,
            available: size as usize,
        });
    }

    let format = FormatChunk {
        audio_format: reader.read_u16_le()?,
        num_channels: reader.read_u16_le()?,
        sample_rate: reader.read_u32_le()?,
        byte_rate: reader.read_u32_le()?,
        block_align: reader.read_u16_le()?,
        bits_per_sample: reader.read_u16_le()?,
    };

    // Extension fields (cbSize etc.) are ignored
    reader.skip_body(size - FMT_PCM_SIZE);

    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a WAV file from a format chunk body and data bytes
    fn wav(fmt: &[u8], extra_chunks: &[(&[u8; 4], &[u8])], data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(b"WAVE");
        for (id, chunk) in extra_chunks {
            body.extend_from_slice(*id);
            body.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
            body.extend_from_slice(chunk);
            if chunk.len() % 2 == 1 {
                body.push(0);
            }
        }
        body.extend_from_slice(b"fmt ");
        body.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
        body.extend_from_slice(fmt);
        body.extend_from_slice(b"data");
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(data);

        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend(body);
        out
    }

    fn fmt(audio_format: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let byte_rate = sample_rate * block_align as u32;
        let mut out = Vec::new();
        out.extend_from_slice(&audio_format.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out
    }

    fn pcm16(values: &[i16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_mono_16bit() {
        let bytes = wav(&fmt(1, 1, 8000, 16), &[], &pcm16(&[0, 16384, -32768, 32767]));
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.metadata.sample_rate, 8000);
        assert_eq!(decoded.metadata.channels, 1);
        assert_eq!(decoded.metadata.bits_per_sample, 16);
        assert_eq!(decoded.metadata.data_byte_size, 8);
        assert!((decoded.metadata.duration_seconds - 8.0 / 16000.0).abs() < 1e-12);
        assert_eq!(
            decoded.samples.samples(),
            &[0.0, 0.5, -1.0, 32767.0 / 32768.0]
        );
    }

    #[test]
    fn test_decode_stereo_averages_channels() {
        let bytes = wav(&fmt(1, 2, 44100, 16), &[], &pcm16(&[16384, 0, -16384, -16384]));
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.samples.samples(), &[0.25, -0.5]);
    }

    #[test]
    fn test_decode_unsigned_8bit() {
        let bytes = wav(&fmt(1, 1, 8000, 8), &[], &[128, 0, 255, 192]);
        let decoded = decode(&bytes).unwrap();

        assert_eq!(
            decoded.samples.samples(),
            &[0.0, -1.0, 127.0 / 128.0, 0.5]
        );
    }

    #[test]
    fn test_skips_unknown_chunks_and_fmt_extension() {
        let mut extended = fmt(1, 1, 8000, 16);
        extended.extend_from_slice(&[0, 0]); // cbSize
        let bytes = wav(
            &extended,
            &[(b"LIST", &b"INFOabc"[..]), (b"JUNK", &[0u8; 4][..])],
            &pcm16(&[16384]),
        );

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.samples.samples(), &[0.5]);
    }

    #[test]
    fn test_not_riff() {
        let mut bytes = wav(&fmt(1, 1, 8000, 16), &[], &[]);
        bytes[0] = b'X';
        assert_eq!(decode(&bytes), Err(DecodeError::NotRiff));
        assert_eq!(decode(b"RI"), Err(DecodeError::NotRiff));
        assert_eq!(decode(&[]), Err(DecodeError::NotRiff));
    }

    #[test]
    fn test_not_wave() {
        let mut bytes = wav(&fmt(1, 1, 8000, 16), &[], &[]);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert_eq!(decode(&bytes), Err(DecodeError::NotWave));
        assert_eq!(decode(b"RIFF\x04\0\0\0WA"), Err(DecodeError::NotWave));
    }

    #[test]
    fn test_rejects_non_pcm() {
        for code in [3u16, 0xFFFE] {
            let bytes = wav(&fmt(code, 1, 8000, 16), &[], &[]);
            assert_eq!(decode(&bytes), Err(DecodeError::UnsupportedFormat(code)));
        }
    }

    #[test]
    fn test_rejects_unsupported_bit_depth() {
        let bytes = wav(&fmt(1, 1, 8000, 24), &[], &[0; 6]);
        assert_eq!(decode(&bytes), Err(DecodeError::UnsupportedBitDepth(24)));
    }

    #[test]
    fn test_rejects_zero_channels() {
        let bytes = wav(&fmt(1, 0, 8000, 16), &[], &[]);
        assert_eq!(decode(&bytes), Err(DecodeError::InvalidChannelCount(0)));
    }

    #[test]
    fn test_missing_fmt_chunk() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&12u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&0u32.to_le_bytes());

        assert_eq!(decode(&bytes), Err(DecodeError::FmtChunkMissing));
    }

    #[test]
    fn test_missing_data_chunk() {
        let mut bytes = wav(&fmt(1, 1, 8000, 16), &[], &[]);
        bytes.truncate(bytes.len() - 8);
        assert_eq!(decode(&bytes), Err(DecodeError::DataChunkMissing));
    }

    #[test]
    fn test_short_fmt_chunk() {
        let bytes = wav(&fmt(1, 1, 8000, 16)[..12], &[], &[]);
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::TruncatedChunk { .. })
        ));
    }

    #[test]
    fn test_declared_data_larger_than_file() {
        let mut bytes = wav(&fmt(1, 1, 8000, 16), &[], &pcm16(&[100, 200, 300]));
        let data_size_offset = bytes.len() - 6 - 4;
        bytes[data_size_offset..data_size_offset + 4].copy_from_slice(&1000u32.to_le_bytes());

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.metadata.data_byte_size, 1000);
        assert_eq!(decoded.samples.len(), 3);
    }

    #[test]
    fn test_parse_exposes_layout_before_samples() {
        let bytes = wav(&fmt(1, 2, 22050, 8), &[], &[128; 8]);
        let layout = parse(&bytes).unwrap();

        assert_eq!(layout.sample_format, SampleFormat::U8);
        assert_eq!(layout.format.block_align, 2);
        assert_eq!(layout.metadata.frame_count(), 4);
        assert_eq!(layout.decode_samples().samples(), &[0.0; 4]);
    }
}
