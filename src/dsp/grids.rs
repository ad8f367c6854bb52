//! Per-invocation pipeline geometry.
//!
//! Everything in here is built once from the search range and sample rate,
//! then read-only for the rest of the run: the geometric candidate grid, the
//! power-of-two window ladder, the ERB-spaced frequency grid, and the
//! fractional map assigning each candidate to its two neighboring window
//! sizes.

use super::utils::{erb_to_hz, hz_to_erb};
use super::{DC, DERBS, DLOG2P, K};

/// Geometric grid of trial pitches at [`DLOG2P`]-octave spacing.
pub struct CandidateGrid {
    /// Candidate pitches in Hz, strictly increasing.
    pub pitch: Vec<f64>,
    /// `log2` of each candidate, kept alongside for the refinement stage.
    pub log2_pitch: Vec<f64>,
}

impl CandidateGrid {
    /// Build the grid covering `[min, max)` Hz.
    pub fn new(min: f64, max: f64) -> Self {
        let len = ((max.log2() - min.log2()) / DLOG2P).ceil() as usize;
        let base = min.log2();
        let mut pitch = Vec::with_capacity(len);
        let mut log2_pitch = Vec::with_capacity(len);
        for i in 0..len {
            let l = base + i as f64 * DLOG2P;
            log2_pitch.push(l);
            pitch.push(l.exp2());
        }
        Self { pitch, log2_pitch }
    }

    pub fn len(&self) -> usize {
        self.pitch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitch.is_empty()
    }
}

/// Strictly decreasing ladder of power-of-two analysis window sizes.
///
/// The largest window is optimal for a pitch at or below `min`, the smallest
/// for a pitch at or above `max`, so every candidate sits between the
/// optimal pitches of two adjacent rungs.
pub struct WindowLadder {
    /// Window sizes in samples, strictly decreasing powers of two.
    pub sizes: Vec<usize>,
}

impl WindowLadder {
    pub fn new(rate: f64, min: f64, max: f64) -> Self {
        let big = (DC * K * rate / min).log2().ceil() as u32;
        let small = (DC * K * rate / max).log2().floor() as u32;
        let sizes = (small..=big).rev().map(|e| 1usize << e).collect();
        Self { sizes }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// The pitch a window of size `w` resolves best.
    pub fn optimal_pitch(rate: f64, w: usize) -> f64 {
        DC * K * rate / w as f64
    }
}

/// ERB-spaced frequency grid from `min / 4` up to Nyquist.
pub struct ErbGrid {
    /// Frequencies in Hz, strictly increasing, spaced [`DERBS`] on the ERB
    /// scale. Never empty for a valid search range.
    pub freqs: Vec<f64>,
}

impl ErbGrid {
    pub fn new(min: f64, nyquist: f64) -> Self {
        let base = hz_to_erb(min / 4.0);
        let len = ((hz_to_erb(nyquist) - base) / DERBS).ceil() as usize;
        let freqs = (0..len)
            .map(|i| erb_to_hz(base + (i + 1) as f64 * DERBS))
            .collect();
        Self { freqs }
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    /// Highest frequency on the grid.
    pub fn top(&self) -> f64 {
        self.freqs[self.freqs.len() - 1]
    }
}

/// Fractional window-size index for each candidate.
///
/// `d[i] = 1` means candidate `i` is exactly optimal for the first (largest)
/// rung; `d[i] = n + 1` for rung index `n`. Each candidate draws from the
/// rungs at `floor(d) - 1` and `ceil(d) - 1` with triangular weights.
pub fn window_assignment(candidates: &CandidateGrid, ladder: &WindowLadder, rate: f64) -> Vec<f64> {
    let first_optimal = WindowLadder::optimal_pitch(rate, ladder.sizes[0]).log2();
    candidates
        .log2_pitch
        .iter()
        .map(|l| 1.0 + l - first_optimal)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_grid_length_and_order() {
        let g = CandidateGrid::new(100.0, 600.0);
        let expected = ((600f64.log2() - 100f64.log2()) / DLOG2P).ceil() as usize;
        assert_eq!(g.len(), expected);
        assert!((g.pitch[0] - 100.0).abs() < 1e-9);
        assert!(g.pitch.windows(2).all(|w| w[0] < w[1]));
        assert!(*g.pitch.last().unwrap() < 600.0);
    }

    #[test]
    fn test_candidate_log2_matches_pitch() {
        let g = CandidateGrid::new(80.0, 400.0);
        for (p, l) in g.pitch.iter().zip(&g.log2_pitch) {
            assert!((p.log2() - l).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ladder_powers_of_two_and_bounds() {
        let rate = 16000.0;
        let ladder = WindowLadder::new(rate, 100.0, 600.0);
        assert!(ladder.sizes.windows(2).all(|w| w[0] > w[1]));
        for &w in &ladder.sizes {
            assert!(w.is_power_of_two());
        }
        let first = WindowLadder::optimal_pitch(rate, ladder.sizes[0]);
        let last = WindowLadder::optimal_pitch(rate, ladder.sizes[ladder.len() - 1]);
        assert!(first <= 100.0, "pO[0] = {first}");
        assert!(last >= 600.0, "pO[last] = {last}");
        assert!(ladder.len() >= 2);
    }

    #[test]
    fn test_erb_grid_spacing_and_span() {
        let g = ErbGrid::new(100.0, 8000.0);
        assert!(!g.is_empty());
        assert!(g.freqs.windows(2).all(|w| w[0] < w[1]));
        assert!(g.freqs[0] > 25.0);
        let spacing = hz_to_erb(g.freqs[1]) - hz_to_erb(g.freqs[0]);
        assert!((spacing - DERBS).abs() < 1e-9);
    }

    #[test]
    fn test_assignment_spans_ladder() {
        let rate = 16000.0;
        let g = CandidateGrid::new(100.0, 600.0);
        let ladder = WindowLadder::new(rate, 100.0, 600.0);
        let d = window_assignment(&g, &ladder, rate);
        assert_eq!(d.len(), g.len());
        assert!(d.windows(2).all(|w| w[0] < w[1]));
        // every candidate falls inside the rung range covered by the ladder
        assert!(d[0] >= 1.0);
        assert!(*d.last().unwrap() <= ladder.len() as f64);
    }
}
