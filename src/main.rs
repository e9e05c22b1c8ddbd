use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use wav_analyzer::analysis::{AnalysisConfig, Analyzer, WindowMode};
use wav_analyzer::model::{AmplitudeScale, AudioMetadata, SpectrumPeak, SpectrumResult};
use wav_analyzer::AnalysisReport;

#[derive(Parser, Debug)]
#[command(name = "wav-analyzer")]
#[command(about = "Decode PCM WAV files and report their spectrum", long_about = None)]
struct Args {
    /// WAV files or directories containing them
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Print a JSON report instead of a summary
    #[arg(long)]
    json: bool,

    /// Also report the spectrum at this playback position (seconds)
    #[arg(long)]
    position: Option<f64>,

    /// FFT size of the one-shot spectrum
    #[arg(long, default_value = "2048")]
    spectrum_fft: usize,

    /// FFT size of spectrogram frames
    #[arg(long, default_value = "512")]
    spectrogram_fft: usize,

    /// Spectrogram hop size (default: half the spectrogram FFT size)
    #[arg(long)]
    hop: Option<usize>,

    /// Skip the Hann window on spectra
    #[arg(long)]
    no_window: bool,

    /// Report linear magnitudes instead of dB
    #[arg(long)]
    linear: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Per-file summary printed by the tool
#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    metadata: AudioMetadata,
    sample_count: usize,
    peak_amplitude: f64,
    spectrum_peak: Option<SpectrumPeak>,
    spectrogram_frames: Option<usize>,
    spectrogram_bins: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spectral_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spectrum: Option<SpectrumResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    live_peak: Option<SpectrumPeak>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args);
    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No WAV files found in {:?}", args.inputs);
    }

    log::info!("Analyzing {} file(s)", files.len());

    let analyzer = Analyzer::with_config(config);
    let results: Vec<(PathBuf, Result<FileReport>)> = files
        .par_iter()
        .map(|path| (path.clone(), analyze_one(&analyzer, path, &args)))
        .collect();

    let mut reports = Vec::new();
    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(report) => {
                if report.spectral_error.is_some() {
                    failures += 1;
                }
                reports.push(report);
            }
            Err(e) => {
                log::error!("{:?}: {:#}", path, e);
                failures += 1;
            }
        }
    }

    if args.json {
        let out = serde_json::to_string_pretty(&reports).context("Failed to serialize report")?;
        println!("{}", out);
    } else {
        for report in &reports {
            print_summary(report);
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} file(s) failed", failures, files.len());
    }
    Ok(())
}

fn build_config(args: &Args) -> AnalysisConfig {
    let mut config = AnalysisConfig::new()
        .with_spectrum_fft_size(args.spectrum_fft)
        .with_spectrogram_fft_size(args.spectrogram_fft);

    if let Some(hop) = args.hop {
        config = config.with_hop_size(hop);
    }
    if args.no_window {
        config = config.with_window(WindowMode::Rectangular);
    }
    if args.linear {
        config = config.with_scale(AmplitudeScale::Linear);
    }
    config
}

/// Expand `~`, walk directories for `.wav` files, keep plain files as given
fn collect_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = PathBuf::from(shellexpand::tilde(input).as_ref());
        if path.is_dir() {
            for entry in WalkDir::new(&path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Failed to walk {:?}", path))?;
                if entry.file_type().is_file() && is_wav(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path);
        }
    }

    Ok(files)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

fn analyze_one(analyzer: &Analyzer, path: &Path, args: &Args) -> Result<FileReport> {
    let report: AnalysisReport = analyzer
        .analyze_file(path)
        .with_context(|| format!("Failed to analyze {:?}", path))?;

    let live_peak = match args.position {
        Some(position) => analyzer
            .reanalyze_around_position(&report.samples, position)
            .context("Failed to compute live spectrum")?
            .and_then(|s| s.peak()),
        None => None,
    };

    if let Some(error) = &report.spectral_error {
        log::warn!("{:?}: spectral analysis incomplete: {}", path, error);
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        metadata: report.metadata,
        sample_count: report.samples.len(),
        peak_amplitude: report.samples.peak(),
        spectrum_peak: report.spectrum.as_ref().and_then(|s| s.peak()),
        spectrogram_frames: report.spectrogram.as_ref().map(|s| s.frame_count()),
        spectrogram_bins: report.spectrogram.as_ref().map(|s| s.bin_count()),
        spectral_error: report.spectral_error.as_ref().map(|e| e.to_string()),
        spectrum: report.spectrum.filter(|_| args.json),
        live_peak,
    })
}

fn print_summary(report: &FileReport) {
    println!("{}", report.path.display());
    println!("  {}", report.metadata);
    println!(
        "  {} samples, peak amplitude {:.4}",
        report.sample_count, report.peak_amplitude
    );
    if let Some(peak) = report.spectrum_peak {
        println!(
            "  Spectrum peak: {:.1} Hz (bin {}, {:.1})",
            peak.frequency_hz, peak.bin, peak.amplitude
        );
    }
    if let (Some(frames), Some(bins)) = (report.spectrogram_frames, report.spectrogram_bins) {
        println!("  Spectrogram: {} frames x {} bins", frames, bins);
    }
    if let Some(error) = &report.spectral_error {
        println!("  Spectral analysis failed: {}", error);
    }
    if let Some(peak) = report.live_peak {
        println!(
            "  Live peak: {:.1} Hz (bin {}, {:.1})",
            peak.frequency_hz, peak.bin, peak.amplitude
        );
    }
}
