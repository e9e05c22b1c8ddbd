//! Playback-driven spectrum updates

use super::history::SpectrogramHistory;
use crate::analysis::spectral::magnitude_to_db;
use crate::analysis::{reanalyze_around_position_with, AnalysisConfig, SpectrumOptions};
use crate::error::AnalysisError;
use crate::model::{AmplitudeScale, SampleBuffer, SpectrumResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Turns playback position ticks into rate-limited spectrum updates
///
/// Ticks closer together than the configured interval are ignored. Each
/// update can also be appended to a shared [`SpectrogramHistory`]; the
/// history always receives linear magnitudes, whatever the display scale.
#[derive(Debug)]
pub struct PlaybackTracker {
    samples: Arc<SampleBuffer>,
    options: SpectrumOptions,
    min_interval: Duration,
    last_update: Option<Instant>,
    history: Option<Arc<SpectrogramHistory>>,
}

impl PlaybackTracker {
    pub fn new(samples: Arc<SampleBuffer>, config: &AnalysisConfig) -> Self {
        Self {
            samples,
            options: config.live_spectrum,
            min_interval: config.live_interval,
            last_update: None,
            history: None,
        }
    }

    /// Append every update to `history`
    pub fn with_history(mut self, history: Arc<SpectrogramHistory>) -> Self {
        self.history = Some(history);
        self
    }

    /// Handle a position tick now
    pub fn on_position(
        &mut self,
        position_seconds: f64,
    ) -> Result<Option<SpectrumResult>, AnalysisError> {
        self.on_position_at(position_seconds, Instant::now())
    }

    /// Handle a position tick observed at `now`
    pub fn on_position_at(
        &mut self,
        position_seconds: f64,
        now: Instant,
    ) -> Result<Option<SpectrumResult>, AnalysisError> {
        if let Some(last) = self.last_update {
            if now.saturating_duration_since(last) < self.min_interval {
                return Ok(None);
            }
        }

        let linear_options = SpectrumOptions {
            scale: AmplitudeScale::Linear,
            ..self.options
        };
        let Some(linear) = reanalyze_around_position_with(
            self.samples.samples(),
            self.samples.sample_rate(),
            position_seconds,
            &linear_options,
        )?
        else {
            return Ok(None);
        };

        self.last_update = Some(now);
        if let Some(history) = &self.history {
            history.push_spectrum(&linear);
        }

        Ok(Some(match self.options.scale {
            AmplitudeScale::Linear => linear,
            AmplitudeScale::Decibels => to_decibels(&linear),
        }))
    }

    /// Forget the last update time, e.g. after a seek
    pub fn reset(&mut self) {
        self.last_update = None;
    }
}

fn to_decibels(linear: &SpectrumResult) -> SpectrumResult {
    let amplitudes = linear.amplitudes().iter().map(|&m| magnitude_to_db(m)).collect();
    SpectrumResult::from_bins(
        amplitudes,
        AmplitudeScale::Decibels,
        linear.fft_size(),
        linear.sample_rate(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compute_spectrogram;
    use std::f64::consts::PI;

    fn tracker() -> PlaybackTracker {
        let samples = Arc::new(SampleBuffer::new(vec![0.1; 8000], 8000));
        PlaybackTracker::new(samples, &AnalysisConfig::new().with_spectrum_fft_size(256))
    }

    #[test]
    fn test_rate_limits_updates() {
        let mut tracker = tracker();
        let start = Instant::now();

        assert!(tracker.on_position_at(0.0, start).unwrap().is_some());
        assert!(tracker
            .on_position_at(0.01, start + Duration::from_millis(20))
            .unwrap()
            .is_none());
        assert!(tracker
            .on_position_at(0.05, start + Duration::from_millis(50))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_reset_allows_immediate_update() {
        let mut tracker = tracker();
        let start = Instant::now();

        tracker.on_position_at(0.0, start).unwrap();
        tracker.reset();
        assert!(tracker.on_position_at(0.5, start).unwrap().is_some());
    }

    #[test]
    fn test_past_end_does_not_consume_interval() {
        let mut tracker = tracker();
        let start = Instant::now();

        assert!(tracker.on_position_at(2.0, start).unwrap().is_none());
        assert!(tracker.on_position_at(0.5, start).unwrap().is_some());
    }

    #[test]
    fn test_feeds_history() {
        let history = Arc::new(SpectrogramHistory::new(2));
        let mut tracker = tracker().with_history(Arc::clone(&history));
        let start = Instant::now();

        for i in 0..3 {
            tracker
                .on_position_at(0.1 * i as f64, start + Duration::from_millis(100 * i))
                .unwrap();
        }

        assert_eq!(history.len(), 2);
        assert_eq!(history.bin_count(), 128);
    }

    #[test]
    fn test_custom_interval() {
        let samples = Arc::new(SampleBuffer::new(vec![0.1; 8000], 8000));
        let config = AnalysisConfig::new()
            .with_spectrum_fft_size(256)
            .with_live_interval(Duration::from_millis(200));
        let mut tracker = PlaybackTracker::new(samples, &config);
        let start = Instant::now();

        assert!(tracker.on_position_at(0.0, start).unwrap().is_some());
        assert!(tracker
            .on_position_at(0.1, start + Duration::from_millis(150))
            .unwrap()
            .is_none());
        assert!(tracker
            .on_position_at(0.2, start + Duration::from_millis(200))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_history_gets_linear_slices_next_to_spectrogram() {
        let sample_rate = 8192;
        let samples: Vec<f64> = (0..8192)
            .map(|i| (2.0 * PI * 1000.0 * i as f64 / sample_rate as f64).sin())
            .collect();
        let spectrogram = compute_spectrogram(&samples, sample_rate, 512, 256).unwrap();

        let history = Arc::new(SpectrogramHistory::new(100));
        history.replace(&spectrogram);
        // floor((8192 - 512) / 256)
        assert_eq!(history.len(), 30);

        // Live spectrum with the same bin count, displayed in dB
        let config = AnalysisConfig::new().with_spectrum_fft_size(512);
        let buffer = Arc::new(SampleBuffer::new(samples, sample_rate));
        let mut tracker = PlaybackTracker::new(buffer, &config).with_history(Arc::clone(&history));

        let shown = tracker.on_position_at(0.5, Instant::now()).unwrap().unwrap();
        assert_eq!(shown.scale(), AmplitudeScale::Decibels);
        assert!(shown.amplitudes().iter().any(|&a| a < 0.0));

        let slices = history.snapshot();
        assert_eq!(slices.len(), 31);
        let pushed = &slices[30];
        assert_eq!(pushed.len(), 256);
        assert!(pushed.iter().all(|&m| m >= 0.0));
        for (&m, &db) in pushed.iter().zip(shown.amplitudes()) {
            assert!((magnitude_to_db(m) - db).abs() < 1e-9);
        }
        // Same window and unit as the spectrogram frame starting at 0.5 s
        let frame = &spectrogram.frames()[16];
        assert!(pushed.iter().zip(frame).all(|(a, b)| (a - b).abs() < 1e-9));
    }
}
