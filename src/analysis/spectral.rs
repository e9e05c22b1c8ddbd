//! Windowed FFT: one-shot spectrum and spectrogram
//!
//! Every function here is a pure function of its inputs. FFT plans are built
//! per call, so independent inputs can be analysed from several threads.

use super::config::{SpectrogramOptions, SpectrumOptions, WindowMode};
use crate::error::SpectralError;
use crate::model::{AmplitudeScale, SpectrogramResult, SpectrumResult};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Added to magnitudes before taking the log so silence stays finite
pub const DB_EPSILON: f64 = 1e-12;

/// Hann window of length `size`: `0.5 * (1 - cos(2*pi*i / (size-1)))`
pub fn hann_window(size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }

    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos()))
        .collect()
}

/// Convert a linear magnitude to decibels
#[inline]
pub fn magnitude_to_db(magnitude: f64) -> f64 {
    20.0 * (magnitude + DB_EPSILON).log10()
}

/// Number of full spectrogram frames: `floor((len - fft_size) / hop_size)`
pub fn spectrogram_frame_count(len: usize, fft_size: usize, hop_size: usize) -> usize {
    if hop_size == 0 || len <= fft_size {
        return 0;
    }
    (len - fft_size) / hop_size
}

/// Spectrum of the first `fft_size` samples with default options (Hann, dB)
pub fn compute_spectrum(
    samples: &[f64],
    sample_rate: u32,
    fft_size: usize,
) -> Result<SpectrumResult, SpectralError> {
    compute_spectrum_with(samples, sample_rate, &SpectrumOptions::new(fft_size))
}

/// Spectrum of the first `options.fft_size` samples
///
/// Shorter input is zero-padded. Bins `0..fft_size/2` are returned.
pub fn compute_spectrum_with(
    samples: &[f64],
    sample_rate: u32,
    options: &SpectrumOptions,
) -> Result<SpectrumResult, SpectralError> {
    let fft_size = options.fft_size;
    let fft = plan_forward(fft_size)?;

    let window = match options.window {
        WindowMode::Hann => Some(hann_window(fft_size)),
        WindowMode::Rectangular => None,
    };

    let mut buffer = vec![Complex::new(0.0, 0.0); fft_size];
    let n = samples.len().min(fft_size);
    for (slot, &sample) in buffer.iter_mut().zip(&samples[..n]) {
        slot.re = sample;
    }
    if let Some(window) = &window {
        for (slot, w) in buffer.iter_mut().zip(window) {
            slot.re *= w;
        }
    }

    fft.process(&mut buffer);

    let amplitudes: Vec<f64> = buffer[..fft_size / 2]
        .iter()
        .map(|c| {
            let magnitude = c.norm();
            match options.scale {
                AmplitudeScale::Decibels => magnitude_to_db(magnitude),
                AmplitudeScale::Linear => magnitude,
            }
        })
        .collect();

    log::debug!(
        "Spectrum: {} input samples, fft_size={}, {} bins",
        samples.len(),
        fft_size,
        amplitudes.len()
    );

    Ok(SpectrumResult::from_bins(
        amplitudes,
        options.scale,
        fft_size,
        sample_rate,
    ))
}

/// Spectrogram with frames of `fft_size` advanced by `hop_size`
pub fn compute_spectrogram(
    samples: &[f64],
    sample_rate: u32,
    fft_size: usize,
    hop_size: usize,
) -> Result<SpectrogramResult, SpectralError> {
    compute_spectrogram_with(
        samples,
        sample_rate,
        &SpectrogramOptions { fft_size, hop_size },
    )
}

/// Spectrogram of Hann-windowed frames, linear magnitude
///
/// Input too short for a single frame gives an empty result, not an error.
pub fn compute_spectrogram_with(
    samples: &[f64],
    sample_rate: u32,
    options: &SpectrogramOptions,
) -> Result<SpectrogramResult, SpectralError> {
    let SpectrogramOptions { fft_size, hop_size } = *options;

    if hop_size == 0 {
        return Err(SpectralError::FftInitFailure {
            reason: "hop size must be at least 1".to_string(),
        });
    }
    let fft = plan_forward(fft_size)?;

    let frame_count = spectrogram_frame_count(samples.len(), fft_size, hop_size);
    if frame_count == 0 {
        log::debug!(
            "Spectrogram: {} samples too short for fft_size={}, hop={}",
            samples.len(),
            fft_size,
            hop_size
        );
        return Ok(SpectrogramResult::empty(fft_size, hop_size, sample_rate));
    }

    let window = hann_window(fft_size);
    let mut buffer = vec![Complex::new(0.0, 0.0); fft_size];
    let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    let mut frames = Vec::with_capacity(frame_count);

    for frame in 0..frame_count {
        let offset = frame * hop_size;
        let block = &samples[offset..offset + fft_size];

        for ((slot, &sample), w) in buffer.iter_mut().zip(block).zip(&window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        fft.process_with_scratch(&mut buffer, &mut scratch);

        frames.push(buffer[..fft_size / 2].iter().map(|c| c.norm()).collect());
    }

    log::debug!(
        "Spectrogram: {} frames of {} bins (fft_size={}, hop={})",
        frames.len(),
        fft_size / 2,
        fft_size,
        hop_size
    );

    Ok(SpectrogramResult::new(
        frames,
        fft_size,
        hop_size,
        sample_rate,
    ))
}

fn plan_forward(fft_size: usize) -> Result<Arc<dyn Fft<f64>>, SpectralError> {
    if fft_size < 2 {
        return Err(SpectralError::FftInitFailure {
            reason: format!("fft size must be at least 2, got {}", fft_size),
        });
    }

    let mut planner = FftPlanner::<f64>::new();
    Ok(planner.plan_fft_forward(fft_size))
}
