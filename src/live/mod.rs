//! Helpers for live views driven by playback position
//!
//! These hold the only rolling state in the crate. The spectral engine itself
//! stays pure; the history and the rate limit belong to the caller.

mod history;
mod tracker;

pub use history::SpectrogramHistory;
pub use tracker::PlaybackTracker;
