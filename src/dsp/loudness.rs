//! ERB-domain loudness analysis for one window size.
//!
//! For a window of `w` samples the signal is framed at hop `w/2` (the first
//! frame is half zero-padded on the left, the last two run past the end),
//! Hann-windowed and transformed; the magnitude spectrum is cubic-spline
//! resampled onto the ERB grid, square-rooted, and each frame row is
//! L2-normalized. The FFT plan and all scratch live in the analyzer and are
//! dropped with it before the next window size is processed.

use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::num::{self, spline, Matrix};

/// Spectral loudness analyzer bound to one sample rate and window size.
pub struct LoudnessAnalyzer {
    window: usize,
    hop: usize,
    hann: Vec<f64>,
    /// Linear frequency grid of the first `w/2` DFT bins.
    freqs: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex<f64>>,
    mags: Vec<f64>,
    slopes: Vec<f64>,
    slope_scratch: Vec<f64>,
}

impl LoudnessAnalyzer {
    /// `window` must be an even power of two from the window ladder.
    pub fn new(rate: f64, window: usize) -> Self {
        let hop = window / 2;
        let hann = (0..window)
            .map(|j| 0.5 - 0.5 * (2.0 * PI * j as f64 / window as f64).cos())
            .collect();
        let freqs = (0..hop).map(|k| k as f64 * rate / window as f64).collect();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(window);
        Self {
            window,
            hop,
            hann,
            freqs,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); window],
            mags: vec![0.0; hop],
            slopes: vec![0.0; hop],
            slope_scratch: vec![0.0; hop],
        }
    }

    /// Number of frames produced for a signal of `n` samples.
    pub fn frame_count(&self, n: usize) -> usize {
        (n as f64 / self.hop as f64).ceil() as usize + 1
    }

    /// Compute the `(frames x |ferbs|)` loudness matrix for `samples`.
    ///
    /// Rows come out with sum-of-squares exactly 1, or exactly 0 for silent
    /// frames.
    pub fn analyze(&mut self, samples: &[f64], ferbs: &[f64]) -> Matrix {
        let frames = self.frame_count(samples.len());
        let mut loud = Matrix::zeros(frames, ferbs.len());

        for j in 0..frames {
            // frame j covers [(j-1)*hop, (j+1)*hop); out-of-range taps are zero
            let start = j as i64 * self.hop as i64 - self.hop as i64;
            for (i, slot) in self.scratch.iter_mut().enumerate() {
                let idx = start + i as i64;
                let s = if idx >= 0 && (idx as usize) < samples.len() {
                    samples[idx as usize]
                } else {
                    0.0
                };
                *slot = Complex::new(s * self.hann[i], 0.0);
            }
            self.fft.process(&mut self.scratch);
            for k in 0..self.hop {
                self.mags[k] = self.scratch[k].norm();
            }

            spline::slopes_into(
                &self.freqs,
                &self.mags,
                &mut self.slope_scratch,
                &mut self.slopes,
            );
            let row = loud.row_mut(j);
            let mut hi = 0;
            for (b, &fq) in ferbs.iter().enumerate() {
                hi = num::bisect_from(&self.freqs, fq, hi);
                let v = spline::eval(&self.freqs, &self.mags, &self.slopes, fq, hi).sqrt();
                // spline overshoot can push the magnitude negative; the root
                // is then NaN and the bin carries no loudness
                row[b] = if v.is_nan() { 0.0 } else { v };
            }
        }

        for j in 0..frames {
            let row = loud.row_mut(j);
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for v in row.iter_mut() {
                    *v /= norm;
                }
            }
        }
        loud
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn hop(&self) -> usize {
        self.hop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::grids::ErbGrid;

    fn sine(freq: f64, rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / rate).sin())
            .collect()
    }

    #[test]
    fn test_frame_count_covers_signal() {
        let a = LoudnessAnalyzer::new(16000.0, 512);
        assert_eq!(a.frame_count(512), 3);
        assert_eq!(a.frame_count(513), 4);
        assert_eq!(a.frame_count(1), 2);
    }

    #[test]
    fn test_rows_are_unit_or_zero() {
        let rate = 16000.0;
        let ferbs = ErbGrid::new(100.0, rate / 2.0);
        let x = sine(250.0, rate, 4000);
        let mut a = LoudnessAnalyzer::new(rate, 512);
        let loud = a.analyze(&x, &ferbs.freqs);
        for j in 0..loud.rows() {
            let ss: f64 = loud.row(j).iter().map(|v| v * v).sum();
            assert!(
                ss.abs() < 1e-9 || (ss - 1.0).abs() < 1e-9,
                "row {j} sum-of-squares {ss}"
            );
        }
    }

    #[test]
    fn test_silence_yields_zero_rows() {
        let rate = 16000.0;
        let ferbs = ErbGrid::new(100.0, rate / 2.0);
        let x = vec![0.0; 2048];
        let mut a = LoudnessAnalyzer::new(rate, 512);
        let loud = a.analyze(&x, &ferbs.freqs);
        for j in 0..loud.rows() {
            assert!(loud.row(j).iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_energy_concentrates_near_tone() {
        let rate = 16000.0;
        let ferbs = ErbGrid::new(100.0, rate / 2.0);
        let x = sine(1000.0, rate, 8192);
        let mut a = LoudnessAnalyzer::new(rate, 1024);
        let loud = a.analyze(&x, &ferbs.freqs);
        // pick an interior frame and find its loudest ERB bin
        let row = loud.row(loud.rows() / 2);
        let (best, _) = row
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        let peak_freq = ferbs.freqs[best];
        assert!(
            (peak_freq - 1000.0).abs() < 100.0,
            "peak at {peak_freq} Hz"
        );
    }
}
