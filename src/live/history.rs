//! Bounded spectrogram history for live display

use crate::model::{AmplitudeScale, SpectrogramResult, SpectrumResult};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ring buffer of spectrogram slices shared between producer and viewer
///
/// All slices must have the same bin count; the first slice fixes it. Once
/// `capacity` slices are held the oldest is dropped for every new one.
#[derive(Debug)]
pub struct SpectrogramHistory {
    capacity: usize,
    state: Mutex<HistoryState>,
}

#[derive(Debug, Default)]
struct HistoryState {
    slices: VecDeque<Vec<f64>>,
    bin_count: usize,
}

impl SpectrogramHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(HistoryState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one slice; returns false if its bin count does not match
    pub fn push(&self, magnitudes: Vec<f64>) -> bool {
        let mut state = self.lock();

        if state.slices.is_empty() && state.bin_count == 0 {
            state.bin_count = magnitudes.len();
        }
        if magnitudes.len() != state.bin_count {
            log::debug!(
                "Rejected spectrogram slice with {} bins (expected {})",
                magnitudes.len(),
                state.bin_count
            );
            return false;
        }

        state.slices.push_back(magnitudes);
        while state.slices.len() > self.capacity {
            state.slices.pop_front();
        }
        true
    }

    /// Append a linear-magnitude spectrum as a new slice
    ///
    /// Decibel spectra are rejected; slices share the spectrogram's unit.
    pub fn push_spectrum(&self, spectrum: &SpectrumResult) -> bool {
        if spectrum.scale() != AmplitudeScale::Linear {
            log::debug!("Rejected spectrum slice in {:?}", spectrum.scale());
            return false;
        }
        self.push(spectrum.amplitudes().to_vec())
    }

    /// Replace the contents with the newest frames of a spectrogram
    pub fn replace(&self, spectrogram: &SpectrogramResult) {
        let mut state = self.lock();
        let frames = spectrogram.frames();
        let skip = frames.len().saturating_sub(self.capacity);

        state.slices = frames[skip..].iter().cloned().collect();
        state.bin_count = frames.first().map_or(0, Vec::len);
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.slices.clear();
        state.bin_count = 0;
    }

    pub fn len(&self) -> usize {
        self.lock().slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().slices.is_empty()
    }

    /// Bins per slice, 0 until the first slice arrives
    pub fn bin_count(&self) -> usize {
        self.lock().bin_count
    }

    /// Copy of the retained slices, oldest first
    pub fn snapshot(&self) -> Vec<Vec<f64>> {
        self.lock().slices.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        // Slices are plain values, a panic elsewhere cannot leave them half-written
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SpectrogramHistory {
    fn default() -> Self {
        Self::new(crate::analysis::config::DEFAULT_HISTORY_CAPACITY)
    }
}
