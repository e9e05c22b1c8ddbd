use serde::{Deserialize, Serialize};
use std::fmt;

/// Format information decoded from the `fmt ` and `data` chunks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    /// Playing time in seconds (data size / byte rate)
    pub duration_seconds: f64,

    /// Frames per second
    pub sample_rate: u32,

    /// Bytes of audio data per second, as declared in the header
    pub byte_rate: u32,

    /// Interleaved channel count
    pub channels: u16,

    /// Bits per single-channel sample
    pub bits_per_sample: u16,

    /// Bit rate (byte rate * 8)
    pub bit_rate_per_second: u32,

    /// Bytes per frame, as declared in the header
    pub block_align: u16,

    /// Declared size of the `data` chunk in bytes
    pub data_byte_size: u32,
}

impl AudioMetadata {
    /// Derive metadata from header fields and the data chunk size
    pub fn new(
        sample_rate: u32,
        byte_rate: u32,
        channels: u16,
        bits_per_sample: u16,
        block_align: u16,
        data_byte_size: u32,
    ) -> Self {
        let duration_seconds = if byte_rate > 0 {
            data_byte_size as f64 / byte_rate as f64
        } else {
            0.0
        };

        Self {
            duration_seconds,
            sample_rate,
            byte_rate,
            channels,
            bits_per_sample,
            bit_rate_per_second: byte_rate.saturating_mul(8),
            block_align,
            data_byte_size,
        }
    }

    /// Bytes per single-channel sample
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample / 8) as usize
    }

    /// Number of whole frames the data chunk declares
    pub fn frame_count(&self) -> usize {
        let frame_bytes = self.channels as usize * self.bytes_per_sample();
        if frame_bytes == 0 {
            return 0;
        }
        self.data_byte_size as usize / frame_bytes
    }
}

impl fmt::Display for AudioMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dur: {:.2} s  SR: {} Hz  BR: {} bps  Ch: {}  Bits: {}",
            self.duration_seconds,
            self.sample_rate,
            self.bit_rate_per_second,
            self.channels,
            self.bits_per_sample
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_fields() {
        let meta = AudioMetadata::new(44100, 176400, 2, 16, 4, 352800);

        assert!((meta.duration_seconds - 2.0).abs() < 1e-12);
        assert_eq!(meta.bit_rate_per_second, 1_411_200);
        assert_eq!(meta.bytes_per_sample(), 2);
        assert_eq!(meta.frame_count(), 88200);
    }

    #[test]
    fn test_zero_byte_rate_has_zero_duration() {
        let meta = AudioMetadata::new(8000, 0, 1, 16, 2, 1000);
        assert_eq!(meta.duration_seconds, 0.0);
    }

    #[test]
    fn test_display() {
        let meta = AudioMetadata::new(8000, 16000, 1, 16, 2, 16000);
        assert_eq!(
            meta.to_string(),
            "Dur: 1.00 s  SR: 8000 Hz  BR: 128000 bps  Ch: 1  Bits: 16"
        );
    }
}
