use serde::Serialize;

/// Lowest value kept by [`SpectrumResult::clamped_db`] with the default range
pub const DEFAULT_MIN_DB: f64 = -120.0;
/// Highest value kept by [`SpectrumResult::clamped_db`] with the default range
pub const DEFAULT_MAX_DB: f64 = 0.0;

/// Unit of spectrum amplitudes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmplitudeScale {
    /// `20 * log10(magnitude + 1e-12)`
    Decibels,
    /// Raw `sqrt(re^2 + im^2)`
    Linear,
}

/// Location of the strongest bin in a spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumPeak {
    pub bin: usize,
    pub frequency_hz: f64,
    pub amplitude: f64,
}

/// Single-frame spectrum over bins `0..fft_size/2`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumResult {
    frequencies_hz: Vec<f64>,
    amplitudes: Vec<f64>,
    scale: AmplitudeScale,
    fft_size: usize,
    sample_rate: u32,
}

impl SpectrumResult {
    /// Build from per-bin amplitudes; frequencies are derived from the bin index
    pub fn from_bins(
        amplitudes: Vec<f64>,
        scale: AmplitudeScale,
        fft_size: usize,
        sample_rate: u32,
    ) -> Self {
        let bin_width = bin_width_hz(sample_rate, fft_size);
        let frequencies_hz = (0..amplitudes.len())
            .map(|bin| bin as f64 * bin_width)
            .collect();

        Self {
            frequencies_hz,
            amplitudes,
            scale,
            fft_size,
            sample_rate,
        }
    }

    /// Bin center frequencies, increasing
    pub fn frequencies_hz(&self) -> &[f64] {
        &self.frequencies_hz
    }

    /// Per-bin amplitudes in [`Self::scale`] units
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn scale(&self) -> AmplitudeScale {
        self.scale
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    pub fn bin_width_hz(&self) -> f64 {
        bin_width_hz(self.sample_rate, self.fft_size)
    }

    /// (frequency, amplitude) pairs in bin order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies_hz
            .iter()
            .copied()
            .zip(self.amplitudes.iter().copied())
    }

    /// Strongest bin; the lowest index wins ties
    pub fn peak(&self) -> Option<SpectrumPeak> {
        let mut best: Option<SpectrumPeak> = None;
        for (bin, (frequency_hz, amplitude)) in self.points().enumerate() {
            if best.map_or(true, |b| amplitude > b.amplitude) {
                best = Some(SpectrumPeak {
                    bin,
                    frequency_hz,
                    amplitude,
                });
            }
        }
        best
    }

    /// Amplitudes bounded to `[min_db, max_db]` for display
    ///
    /// Only meaningful for decibel spectra; linear spectra are returned as-is.
    pub fn clamped_db(&self, min_db: f64, max_db: f64) -> Vec<f64> {
        match self.scale {
            AmplitudeScale::Decibels => self
                .amplitudes
                .iter()
                .map(|a| a.clamp(min_db, max_db))
                .collect(),
            AmplitudeScale::Linear => self.amplitudes.clone(),
        }
    }
}

/// Time-ordered frames of linear magnitudes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrogramResult {
    frames: Vec<Vec<f64>>,
    fft_size: usize,
    hop_size: usize,
    sample_rate: u32,
}

impl SpectrogramResult {
    pub fn new(frames: Vec<Vec<f64>>, fft_size: usize, hop_size: usize, sample_rate: u32) -> Self {
        Self {
            frames,
            fft_size,
            hop_size,
            sample_rate,
        }
    }

    /// A spectrogram with no frames
    pub fn empty(fft_size: usize, hop_size: usize, sample_rate: u32) -> Self {
        Self::new(Vec::new(), fft_size, hop_size, sample_rate)
    }

    /// Frames indexed by time; each frame is indexed by frequency bin
    pub fn frames(&self) -> &[Vec<f64>] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Bins per frame (`fft_size / 2`)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start time of a frame in seconds
    pub fn frame_time_seconds(&self, frame: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (frame * self.hop_size) as f64 / self.sample_rate as f64
    }

    pub fn bin_frequency_hz(&self, bin: usize) -> f64 {
        bin as f64 * bin_width_hz(self.sample_rate, self.fft_size)
    }
}

fn bin_width_hz(sample_rate: u32, fft_size: usize) -> f64 {
    if fft_size == 0 {
        return 0.0;
    }
    sample_rate as f64 / fft_size as f64
}
