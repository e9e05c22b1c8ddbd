//! Analysis configuration

use crate::model::AmplitudeScale;
use std::time::Duration;

/// Default FFT length of the one-shot spectrum
pub const DEFAULT_SPECTRUM_FFT_SIZE: usize = 2048;
/// Default FFT length of spectrogram frames
pub const DEFAULT_SPECTROGRAM_FFT_SIZE: usize = 512;
/// Default minimum spacing between live spectrum updates
pub const DEFAULT_LIVE_INTERVAL: Duration = Duration::from_millis(50);
/// Default number of slices kept by a live spectrogram history
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// Window applied to each block before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// `0.5 * (1 - cos(2*pi*i / (N-1)))`
    Hann,
    /// No tapering (raw/debug output)
    Rectangular,
}

/// Parameters of the one-shot spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectrumOptions {
    pub fft_size: usize,
    pub window: WindowMode,
    pub scale: AmplitudeScale,
}

impl SpectrumOptions {
    pub fn new(fft_size: usize) -> Self {
        Self {
            fft_size,
            ..Self::default()
        }
    }
}

impl Default for SpectrumOptions {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_SPECTRUM_FFT_SIZE,
            window: WindowMode::Hann,
            scale: AmplitudeScale::Decibels,
        }
    }
}

/// Parameters of the spectrogram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectrogramOptions {
    pub fft_size: usize,
    pub hop_size: usize,
}

impl SpectrogramOptions {
    /// Frames of `fft_size` with 50% overlap
    pub fn new(fft_size: usize) -> Self {
        Self {
            fft_size,
            hop_size: fft_size / 2,
        }
    }

    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = hop_size;
        self
    }
}

impl Default for SpectrogramOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SPECTROGRAM_FFT_SIZE)
    }
}

/// Configuration for the whole analysis pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// One-shot spectrum over the start of the file
    pub spectrum: SpectrumOptions,

    /// Spectrogram over the whole file
    pub spectrogram: SpectrogramOptions,

    /// Spectrum used for playback-position updates
    pub live_spectrum: SpectrumOptions,

    /// Minimum spacing between live updates (caller-side rate limit)
    pub live_interval: Duration,

    /// Maximum slices retained by a live spectrogram history
    pub history_capacity: usize,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self {
            spectrum: SpectrumOptions::default(),
            spectrogram: SpectrogramOptions::default(),
            live_spectrum: SpectrumOptions::default(),
            live_interval: DEFAULT_LIVE_INTERVAL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Set the FFT size of both the one-shot and the live spectrum
    pub fn with_spectrum_fft_size(mut self, fft_size: usize) -> Self {
        self.spectrum.fft_size = fft_size;
        self.live_spectrum.fft_size = fft_size;
        self
    }

    /// Set the spectrogram FFT size; the hop is reset to half of it
    pub fn with_spectrogram_fft_size(mut self, fft_size: usize) -> Self {
        self.spectrogram = SpectrogramOptions::new(fft_size);
        self
    }

    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.spectrogram.hop_size = hop_size;
        self
    }

    /// Set the window of both spectra
    pub fn with_window(mut self, window: WindowMode) -> Self {
        self.spectrum.window = window;
        self.live_spectrum.window = window;
        self
    }

    /// Set the amplitude unit of both spectra
    pub fn with_scale(mut self, scale: AmplitudeScale) -> Self {
        self.spectrum.scale = scale;
        self.live_spectrum.scale = scale;
        self
    }

    pub fn with_live_interval(mut self, interval: Duration) -> Self {
        self.live_interval = interval;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}
