//! SWIPE' pitch tracker.
//!
//! Estimates the fundamental-frequency track of a single-channel signal by
//! scoring a geometric grid of pitch candidates against ERB-scale loudness
//! spectra computed at several power-of-two window sizes, then refining the
//! per-frame winner in log-period space. Offline only: the whole signal is
//! in memory before tracking starts.
//!
//! ```no_run
//! use swipetrack::{pitch_track, TrackParams};
//!
//! let samples = vec![0.0f64; 16000];
//! let track = pitch_track(&samples, 16000.0, &TrackParams::default()).unwrap();
//! assert_eq!(track.len(), 1000);
//! ```

pub mod dsp;
pub mod error;
pub mod num;
pub mod tracker;
pub mod wav;

pub use error::{Result, TrackError};
pub use tracker::{pitch_track, TrackParams, DEFAULT_STRENGTH_THRESHOLD, MIN_TIME_STEP};
pub use wav::{read_wav, read_wav_file, AudioInput};
