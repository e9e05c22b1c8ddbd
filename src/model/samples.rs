use serde::Serialize;

/// Mono waveform, one normalized value per audio frame
///
/// Values are in `[-1.0, 1.0]`. The buffer never changes after decoding;
/// share it by reference (or `Arc`) for repeated live analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleBuffer {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the waveform in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Index of the frame playing at `seconds`, if inside the buffer
    pub fn index_at(&self, seconds: f64) -> Option<usize> {
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }

        let index = (seconds * self.sample_rate as f64).floor() as usize;
        (index < self.samples.len()).then_some(index)
    }

    /// Copy `len` samples starting at `start`, zero-padding past the end
    pub fn window(&self, start: usize, len: usize) -> Vec<f64> {
        let mut out = vec![0.0; len];
        if start < self.samples.len() {
            let available = &self.samples[start..];
            let n = available.len().min(len);
            out[..n].copy_from_slice(&available[..n]);
        }
        out
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f64 {
        self.samples.iter().map(|s| s.abs()).fold(0.0, f64::max)
    }
}

impl AsRef<[f64]> for SampleBuffer {
    fn as_ref(&self) -> &[f64] {
        &self.samples
    }
}
