//! Analysis pipeline: decode, downmix, spectrum, spectrogram

use super::config::{AnalysisConfig, SpectrumOptions};
use super::spectral::{compute_spectrogram_with, compute_spectrum_with};
use super::traits::{AnalysisEvent, AnalysisReport, AnalysisSink};
use crate::error::{AnalysisError, SpectralError};
use crate::model::{SampleBuffer, SpectrumResult};
use crate::wav;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Runs the full pipeline over a WAV file
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Read and analyze a file, returning every product that was produced
    ///
    /// `Err` only for read and decode failures. A spectral failure leaves the
    /// metadata and waveform in the report and sets `spectral_error`.
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_file_with(path, &mut ())
    }

    /// Read and analyze a file, handing each product to `sink` as it is ready
    pub fn analyze_file_with<S>(
        &self,
        path: &Path,
        sink: &mut S,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        S: AnalysisSink + ?Sized,
    {
        log::info!("Analyzing: {:?}", path);

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                let error = AnalysisError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                log::warn!("{}", error);
                sink.on_error(&error);
                return Err(error);
            }
        };

        self.analyze_bytes_with(&bytes, sink)
    }

    /// Analyze a WAV file already in memory
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_bytes_with(bytes, &mut ())
    }

    /// Analyze a WAV file already in memory with staged delivery
    pub fn analyze_bytes_with<S>(
        &self,
        bytes: &[u8],
        sink: &mut S,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        S: AnalysisSink + ?Sized,
    {
        match self.run_stages(bytes, sink) {
            Ok(report) => Ok(report),
            Err(error) => {
                log::warn!("Analysis failed: {}", error);
                sink.on_error(&error);
                Err(error)
            }
        }
    }

    fn run_stages<S>(&self, bytes: &[u8], sink: &mut S) -> Result<AnalysisReport, AnalysisError>
    where
        S: AnalysisSink + ?Sized,
    {
        // Stage 1: header
        let layout = wav::parse(bytes)?;
        let metadata = layout.metadata;
        log::info!("{}", metadata);
        sink.on_metadata(&metadata);

        // Stage 2: waveform
        let samples = Arc::new(layout.decode_samples());
        log::debug!(
            "Waveform ready: {} samples, peak {:.4}",
            samples.len(),
            samples.peak()
        );
        sink.on_waveform(&samples);

        let mut report = AnalysisReport::new(metadata, samples);
        if let Err(error) = self.run_spectral_stages(&mut report, sink) {
            log::warn!("Spectral analysis failed: {}", error);
            sink.on_error(&AnalysisError::Spectral(error.clone()));
            report.spectral_error = Some(error);
        }

        Ok(report)
    }

    fn run_spectral_stages<S>(
        &self,
        report: &mut AnalysisReport,
        sink: &mut S,
    ) -> Result<(), SpectralError>
    where
        S: AnalysisSink + ?Sized,
    {
        let samples = Arc::clone(&report.samples);
        let sample_rate = report.metadata.sample_rate;

        // Stage 3: spectrum over the start of the file
        let spectrum = compute_spectrum_with(samples.samples(), sample_rate, &self.config.spectrum)?;
        sink.on_spectrum(&spectrum);
        report.spectrum = Some(spectrum);

        // Stage 4: spectrogram over the whole file
        let spectrogram =
            compute_spectrogram_with(samples.samples(), sample_rate, &self.config.spectrogram)?;
        sink.on_spectrogram(&spectrogram);

        log::info!(
            "Analysis complete: {} samples, {} spectrogram frames",
            samples.len(),
            spectrogram.frame_count()
        );
        report.spectrogram = Some(spectrogram);

        Ok(())
    }

    /// Live spectrum at a playback position, using the configured live options
    pub fn reanalyze_around_position(
        &self,
        samples: &SampleBuffer,
        position_seconds: f64,
    ) -> Result<Option<SpectrumResult>, AnalysisError> {
        reanalyze_around_position_with(
            samples.samples(),
            samples.sample_rate(),
            position_seconds,
            &self.config.live_spectrum,
        )
    }
}

/// Spectrum of up to `fft_size` samples starting at the playback position
///
/// Returns `Ok(None)` when the position is at or past the end of the data.
pub fn reanalyze_around_position(
    samples: &[f64],
    sample_rate: u32,
    position_seconds: f64,
    fft_size: usize,
) -> Result<Option<SpectrumResult>, AnalysisError> {
    reanalyze_around_position_with(
        samples,
        sample_rate,
        position_seconds,
        &SpectrumOptions::new(fft_size),
    )
}

pub fn reanalyze_around_position_with(
    samples: &[f64],
    sample_rate: u32,
    position_seconds: f64,
    options: &SpectrumOptions,
) -> Result<Option<SpectrumResult>, AnalysisError> {
    // Negative or non-finite positions never produce an update
    if !position_seconds.is_finite() || position_seconds < 0.0 {
        return Ok(None);
    }

    let start = (position_seconds * sample_rate as f64).floor() as usize;
    if start >= samples.len() {
        return Ok(None);
    }

    let end = start.saturating_add(options.fft_size).min(samples.len());
    let spectrum = compute_spectrum_with(&samples[start..end], sample_rate, options)?;
    Ok(Some(spectrum))
}

/// Analyze a file on a background thread, streaming products over a channel
///
/// The channel closes when the analysis ends, successfully or not.
pub fn spawn_analysis(
    path: PathBuf,
    config: AnalysisConfig,
) -> (JoinHandle<()>, Receiver<AnalysisEvent>) {
    let (mut sender, receiver) = mpsc::channel();

    let handle = thread::spawn(move || {
        let analyzer = Analyzer::with_config(config);
        // Failures already reached the receiver as `AnalysisEvent::Failed`
        let _ = analyzer.analyze_file_with(&path, &mut sender);
    });

    (handle, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_reanalyze_past_end_is_none() {
        let samples = vec![0.0; 8000];

        assert!(reanalyze_around_position(&samples, 8000, 1.0, 2048)
            .unwrap()
            .is_none());
        assert!(reanalyze_around_position(&samples, 8000, 5.0, 2048)
            .unwrap()
            .is_none());
        assert!(reanalyze_around_position(&samples, 8000, -1.0, 2048)
            .unwrap()
            .is_none());
        assert!(reanalyze_around_position(&[], 8000, 0.0, 2048)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_reanalyze_uses_window_at_position() {
        let sample_rate = 8000;
        // 250 Hz for the first second, 1000 Hz for the second
        let samples: Vec<f64> = (0..16000)
            .map(|i| {
                let freq = if i < 8000 { 250.0 } else { 1000.0 };
                (2.0 * PI * freq * i as f64 / sample_rate as f64).sin()
            })
            .collect();

        let early = reanalyze_around_position(&samples, sample_rate, 0.1, 2048)
            .unwrap()
            .unwrap();
        let late = reanalyze_around_position(&samples, sample_rate, 1.2, 2048)
            .unwrap()
            .unwrap();

        assert_eq!(early.peak().unwrap().bin, 64);
        assert_eq!(late.peak().unwrap().bin, 256);
    }

    #[test]
    fn test_reanalyze_zero_pads_tail() {
        let samples = vec![0.25; 100];
        let spectrum = reanalyze_around_position(&samples, 100, 0.5, 2048)
            .unwrap()
            .unwrap();

        assert_eq!(spectrum.len(), 1024);
        assert_eq!(spectrum.fft_size(), 2048);
    }

    #[test]
    fn test_analyze_missing_file_is_io_error() {
        let result = Analyzer::new().analyze_file(Path::new("/nonexistent/file.wav"));
        assert!(matches!(result, Err(AnalysisError::Io { .. })));
    }

    /// Canonical 16-bit mono WAV
    fn mono16(samples: &[i16], sample_rate: u32) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_complete_report() {
        let bytes = mono16(&[1000; 4000], 8000);
        let report = Analyzer::new().analyze_bytes(&bytes).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.samples.len(), 4000);
        assert_eq!(report.spectrum.as_ref().map(|s| s.len()), Some(1024));
        // floor((4000 - 512) / 256)
        assert_eq!(report.spectrogram.as_ref().map(|s| s.frame_count()), Some(13));
    }

    #[test]
    fn test_spectral_failure_keeps_decoded_products() {
        let bytes = mono16(&[1000; 4000], 8000);
        let analyzer = Analyzer::with_config(AnalysisConfig::new().with_hop_size(0));

        let report = analyzer.analyze_bytes(&bytes).unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.metadata.sample_rate, 8000);
        assert_eq!(report.samples.len(), 4000);
        assert!(report.spectrum.is_some());
        assert!(report.spectrogram.is_none());
        assert!(matches!(
            report.spectral_error,
            Some(SpectralError::FftInitFailure { .. })
        ));
    }

    #[test]
    fn test_spectrum_failure_skips_spectrogram() {
        let bytes = mono16(&[1000; 4000], 8000);
        let analyzer = Analyzer::with_config(AnalysisConfig::new().with_spectrum_fft_size(1));

        let report = analyzer.analyze_bytes(&bytes).unwrap();

        assert!(report.spectrum.is_none());
        assert!(report.spectrogram.is_none());
        assert!(report.spectral_error.is_some());
    }

    #[test]
    fn test_reanalyze_invalid_fft_is_analysis_error() {
        let result = reanalyze_around_position(&[0.0; 100], 8000, 0.0, 1);
        assert!(matches!(
            result,
            Err(AnalysisError::Spectral(SpectralError::FftInitFailure { .. }))
        ));
    }
}
