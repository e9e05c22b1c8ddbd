//! Staged delivery of analysis products

use crate::error::{AnalysisError, SpectralError};
use crate::model::{AudioMetadata, SampleBuffer, SpectrogramResult, SpectrumResult};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Receiver of analysis products, called as soon as each one is ready
///
/// Order is metadata, waveform, spectrum, spectrogram. A failure is reported
/// through [`AnalysisSink::on_error`] and ends the run; products already
/// delivered stay valid. All methods default to doing nothing.
pub trait AnalysisSink {
    fn on_metadata(&mut self, _metadata: &AudioMetadata) {}

    fn on_waveform(&mut self, _samples: &Arc<SampleBuffer>) {}

    fn on_spectrum(&mut self, _spectrum: &SpectrumResult) {}

    fn on_spectrogram(&mut self, _spectrogram: &SpectrogramResult) {}

    fn on_error(&mut self, _error: &AnalysisError) {}
}

/// Sink that ignores everything
impl AnalysisSink for () {}

/// One product of a staged analysis, as sent over a channel
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    Metadata(AudioMetadata),
    Waveform(Arc<SampleBuffer>),
    Spectrum(SpectrumResult),
    Spectrogram(SpectrogramResult),
    /// Human-readable description of the failure
    Failed(String),
}

impl AnalysisSink for Sender<AnalysisEvent> {
    fn on_metadata(&mut self, metadata: &AudioMetadata) {
        forward(self, AnalysisEvent::Metadata(*metadata));
    }

    fn on_waveform(&mut self, samples: &Arc<SampleBuffer>) {
        forward(self, AnalysisEvent::Waveform(Arc::clone(samples)));
    }

    fn on_spectrum(&mut self, spectrum: &SpectrumResult) {
        forward(self, AnalysisEvent::Spectrum(spectrum.clone()));
    }

    fn on_spectrogram(&mut self, spectrogram: &SpectrogramResult) {
        forward(self, AnalysisEvent::Spectrogram(spectrogram.clone()));
    }

    fn on_error(&mut self, error: &AnalysisError) {
        forward(self, AnalysisEvent::Failed(error.to_string()));
    }
}

fn forward(sender: &Sender<AnalysisEvent>, event: AnalysisEvent) {
    if sender.send(event).is_err() {
        log::debug!("Analysis event dropped: receiver is gone");
    }
}

/// Products of one analysis run
///
/// Metadata and the waveform are always present. The spectrum and the
/// spectrogram are `None` if their stage failed or did not run; the failure
/// is kept in `spectral_error`.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub metadata: AudioMetadata,

    /// Mono waveform, shared so live re-analysis can hold on to it
    pub samples: Arc<SampleBuffer>,

    /// One-shot spectrum over the start of the file
    pub spectrum: Option<SpectrumResult>,

    /// Spectrogram over the whole file
    pub spectrogram: Option<SpectrogramResult>,

    pub spectral_error: Option<SpectralError>,
}

impl AnalysisReport {
    /// Report holding only the decoded products
    pub fn new(metadata: AudioMetadata, samples: Arc<SampleBuffer>) -> Self {
        Self {
            metadata,
            samples,
            spectrum: None,
            spectrogram: None,
            spectral_error: None,
        }
    }

    /// True once every stage produced its result
    pub fn is_complete(&self) -> bool {
        self.spectral_error.is_none() && self.spectrum.is_some() && self.spectrogram.is_some()
    }
}
