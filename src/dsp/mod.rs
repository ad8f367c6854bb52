//! DSP stages of the SWIPE' pitch-strength pipeline.
//!
//! The stages run strictly forward, one pass per window size:
//!
//! ## Geometry (built once per invocation)
//! - [`grids`] - candidate pitch grid, power-of-two window ladder, ERB
//!   frequency grid, and the fractional window-assignment map
//!
//! ## Per-window analysis
//! - [`loudness`] - windowed DFT magnitudes resampled onto ERB-spaced
//!   frequencies, square-rooted and row-normalized
//! - [`kernel`] - prime-harmonic cosine template for one candidate pitch
//! - [`strength`] - kernel-vs-loudness inner products accumulated into the
//!   global candidate-by-frame strength matrix with triangular
//!   window weighting
//!
//! ## Decision
//! - [`extract`] - per-frame argmax with parabolic refinement in log-period
//!   space
//!
//! ## Utilities
//! - [`utils`] - ERB and Mel scale conversions

pub mod extract;
pub mod grids;
pub mod kernel;
pub mod loudness;
pub mod strength;
pub mod utils;

pub use extract::extract_pitch;
pub use grids::{window_assignment, CandidateGrid, ErbGrid, WindowLadder};
pub use kernel::strength_kernel;
pub use loudness::LoudnessAnalyzer;
pub use strength::accumulate_window;

/// Candidate-grid spacing in octaves (1/96 octave between trial pitches).
pub const DLOG2P: f64 = 1.0 / 96.0;

/// ERB-grid spacing on the ERB scale.
pub const DERBS: f64 = 0.1;

/// Log-frequency resolution of the parabolic refinement, in octaves.
pub const POLYV: f64 = 1.0 / (12.0 * 64.0);

/// Duty-cycle factor in the window-optimality relation `pO = DC * K * rate / w`.
pub const DC: f64 = 4.0;

/// Window-size optimality factor: a window of size `w` is "optimal" for the
/// pitch `DC * K * rate / w`.
pub const K: f64 = 2.0;
