//! Top-level pitch tracking: parameter handling and pipeline orchestration.

use log::{debug, warn};

use crate::dsp::{
    accumulate_window, extract_pitch, window_assignment, CandidateGrid, ErbGrid, LoudnessAnalyzer,
    WindowLadder,
};
use crate::error::{Result, TrackError};
use crate::num::{primes::prime_flags, Matrix};

/// Default voicing threshold on pitch strength.
pub const DEFAULT_STRENGTH_THRESHOLD: f64 = 0.3;

/// Smallest accepted output time step, in seconds.
pub const MIN_TIME_STEP: f64 = 0.001;

/// Search-range and output parameters for one tracking run.
///
/// Out-of-range values are clamped (with a logged warning) inside
/// [`pitch_track`]; see [`TrackParams::clamped`]. Structurally invalid
/// combinations (`max <= min`, `min < 1`) are rejected instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackParams {
    /// Lower end of the pitch search range in Hz; at least 1.0.
    pub min_pitch: f64,
    /// Upper end of the pitch search range in Hz; clamped to Nyquist.
    pub max_pitch: f64,
    /// Frames whose best strength is at or below this are unvoiced.
    pub strength_threshold: f64,
    /// Output frame spacing in seconds.
    pub time_step: f64,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            min_pitch: 100.0,
            max_pitch: 600.0,
            strength_threshold: DEFAULT_STRENGTH_THRESHOLD,
            time_step: MIN_TIME_STEP,
        }
    }
}

impl TrackParams {
    /// The parameters [`pitch_track`] will actually run with at `rate`.
    ///
    /// Clamps `max_pitch` to Nyquist, the strength threshold into `[0, 1]`
    /// (falling back to the default when outside), and the time step into
    /// `[MIN_TIME_STEP, rate]`. Idempotent; callers that need the effective
    /// time step for timestamping can call this themselves.
    pub fn clamped(&self, rate: f64) -> TrackParams {
        let mut out = *self;
        let nyquist = rate / 2.0;
        if out.max_pitch > nyquist {
            warn!(
                "max pitch {} Hz above Nyquist, clamping to {} Hz",
                out.max_pitch, nyquist
            );
            out.max_pitch = nyquist;
        }
        if !(0.0..=1.0).contains(&out.strength_threshold) {
            warn!(
                "strength threshold {} outside [0, 1], using default {}",
                out.strength_threshold, DEFAULT_STRENGTH_THRESHOLD
            );
            out.strength_threshold = DEFAULT_STRENGTH_THRESHOLD;
        }
        if out.time_step < MIN_TIME_STEP {
            warn!(
                "time step {} s too small, clamping to {} s",
                out.time_step, MIN_TIME_STEP
            );
            out.time_step = MIN_TIME_STEP;
        }
        if out.time_step > rate {
            warn!("time step {} s too large, clamping to {}", out.time_step, rate);
            out.time_step = rate;
        }
        out
    }
}

/// Track the fundamental frequency of `samples` at `rate` Hz.
///
/// Returns `ceil((N/rate)/dt)` values, one per `dt` of signal: a pitch in
/// Hz, or NaN for frames whose pitch strength stays at or below the
/// threshold. The computation is deterministic; identical inputs give
/// bit-identical output.
pub fn pitch_track(samples: &[f64], rate: f64, params: &TrackParams) -> Result<Vec<f64>> {
    if samples.is_empty() {
        return Err(TrackError::EmptySignal);
    }
    if !(rate > 0.0 && rate.is_finite()) {
        return Err(TrackError::InvalidRate(rate));
    }
    let p = params.clamped(rate);
    if p.min_pitch < 1.0 || p.max_pitch <= p.min_pitch {
        return Err(TrackError::InvalidRange {
            min: p.min_pitch,
            max: p.max_pitch,
        });
    }

    let nyquist = rate / 2.0;
    let candidates = CandidateGrid::new(p.min_pitch, p.max_pitch);
    let ladder = WindowLadder::new(rate, p.min_pitch, p.max_pitch);
    let d = window_assignment(&candidates, &ladder, rate);
    let ferbs = ErbGrid::new(p.min_pitch, nyquist);
    let primes = prime_flags((ferbs.top() / candidates.pitch[0]).ceil() as usize);

    let frames = ((samples.len() as f64 / rate) / p.time_step).ceil() as usize;
    debug!(
        "tracking {} samples at {} Hz: {} candidates, {} windows ({}..{}), {} ERB bins, {} output frames",
        samples.len(),
        rate,
        candidates.len(),
        ladder.len(),
        ladder.sizes[0],
        ladder.sizes[ladder.len() - 1],
        ferbs.len(),
        frames
    );

    let mut strength = Matrix::zeros(candidates.len(), frames);
    for (n, &w) in ladder.sizes.iter().enumerate() {
        let mut analyzer = LoudnessAnalyzer::new(rate, w);
        let loud = analyzer.analyze(samples, &ferbs.freqs);
        accumulate_window(
            &mut strength,
            &loud,
            &ferbs.freqs,
            &candidates.pitch,
            &d,
            &primes,
            n,
            n + 1 == ladder.len(),
            analyzer.hop() as f64 / rate,
            p.time_step,
        );
    }

    Ok(extract_pitch(&strength, &candidates, p.strength_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_signal() {
        let r = pitch_track(&[], 16000.0, &TrackParams::default());
        assert!(matches!(r, Err(TrackError::EmptySignal)));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let params = TrackParams {
            min_pitch: 600.0,
            max_pitch: 100.0,
            ..TrackParams::default()
        };
        let r = pitch_track(&[0.0; 1000], 16000.0, &params);
        assert!(matches!(r, Err(TrackError::InvalidRange { .. })));
    }

    #[test]
    fn test_rejects_min_below_one() {
        let params = TrackParams {
            min_pitch: 0.5,
            ..TrackParams::default()
        };
        let r = pitch_track(&[0.0; 1000], 16000.0, &params);
        assert!(matches!(r, Err(TrackError::InvalidRange { .. })));
    }

    #[test]
    fn test_rejects_bad_rate() {
        let r = pitch_track(&[0.0; 100], 0.0, &TrackParams::default());
        assert!(matches!(r, Err(TrackError::InvalidRate(_))));
        let r = pitch_track(&[0.0; 100], -8000.0, &TrackParams::default());
        assert!(matches!(r, Err(TrackError::InvalidRate(_))));
    }

    #[test]
    fn test_clamping_rules() {
        let rate = 16000.0;
        let p = TrackParams {
            min_pitch: 100.0,
            max_pitch: 20000.0,
            strength_threshold: 2.0,
            time_step: 0.0001,
        }
        .clamped(rate);
        assert_eq!(p.max_pitch, 8000.0);
        assert_eq!(p.strength_threshold, DEFAULT_STRENGTH_THRESHOLD);
        assert_eq!(p.time_step, MIN_TIME_STEP);
        // idempotent
        assert_eq!(p.clamped(rate), p);
    }

    #[test]
    fn test_nyquist_clamp_can_invalidate_range() {
        // clamping max below min is a range error, not a crash
        let params = TrackParams {
            min_pitch: 100.0,
            max_pitch: 600.0,
            ..TrackParams::default()
        };
        let r = pitch_track(&[0.0; 64], 150.0, &params);
        assert!(matches!(r, Err(TrackError::InvalidRange { .. })));
    }

    #[test]
    fn test_short_signal_still_fills_output() {
        // shorter than the smallest analysis window
        let params = TrackParams {
            time_step: 0.01,
            ..TrackParams::default()
        };
        let x = vec![0.0; 50];
        let track = pitch_track(&x, 16000.0, &params).unwrap();
        let expected = ((50.0 / 16000.0) / 0.01_f64).ceil() as usize;
        assert_eq!(track.len(), expected);
        assert!(track.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_single_frame_output() {
        let params = TrackParams {
            time_step: 1.0,
            ..TrackParams::default()
        };
        let x = vec![0.0; 1600]; // 0.1 s
        let track = pitch_track(&x, 16000.0, &params).unwrap();
        assert_eq!(track.len(), 1);
    }
}
