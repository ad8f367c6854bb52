//! Error taxonomy for the tracker library.

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors the library can report.
///
/// Numeric edge cases inside a valid run (zero-strength frames, spline
/// overshoot) are never errors; they surface as unvoiced frames instead.
#[derive(Error, Debug)]
pub enum TrackError {
    /// Pitch search range failed validation.
    #[error("invalid pitch range {min}:{max} (need 1.0 <= min < max <= Nyquist)")]
    InvalidRange { min: f64, max: f64 },

    /// Sample rate must be positive and finite.
    #[error("invalid sample rate: {0} Hz")]
    InvalidRate(f64),

    /// The input signal carried no samples.
    #[error("signal contains no samples")]
    EmptySignal,

    /// WAV decoding failed.
    #[error("WAV decode failed: {0}")]
    Wav(#[from] hound::Error),

    /// Underlying I/O failure.
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_parameters() {
        let err = TrackError::InvalidRange {
            min: 600.0,
            max: 100.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("600"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TrackError = io.into();
        assert!(matches!(err, TrackError::Io(_)));
    }
}
