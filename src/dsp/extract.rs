//! Pitch extraction from the assembled strength matrix.
//!
//! Per output frame: take the strongest candidate; below the strength
//! threshold the frame is unvoiced (NaN). Interior winners are refined by
//! fitting a parabola to the three-candidate neighborhood in a normalized
//! period coordinate and searching its maximum on a [`POLYV`]-octave grid.
//! Winners on either edge of the candidate grid are emitted as-is.

use std::f64::consts::TAU;

use crate::num::{poly, Matrix};

use super::grids::CandidateGrid;
use super::POLYV;

/// Walk the strength matrix and emit one pitch (or NaN) per output frame.
///
/// Never fails: frames with NaN strength or no mass above `threshold` come
/// out as NaN.
pub fn extract_pitch(strength: &Matrix, candidates: &CandidateGrid, threshold: f64) -> Vec<f64> {
    let p = strength.rows();
    let mut track = vec![f64::NAN; strength.cols()];
    if p == 0 {
        return track;
    }

    // the grid is geometric, so the refinement search width is the same for
    // every frame: two candidate spacings at POLYV resolution
    let search = if p >= 3 {
        ((candidates.log2_pitch[2] - candidates.log2_pitch[0]) / POLYV).round() as usize + 1
    } else {
        0
    };

    for (j, out) in track.iter_mut().enumerate() {
        let mut max_i = 0usize;
        let mut max_v = f64::NEG_INFINITY;
        for i in 0..p {
            let v = strength[(i, j)];
            if v > max_v {
                max_v = v;
                max_i = i;
            }
        }
        if !(max_v > threshold) {
            continue; // unvoiced
        }
        if max_i == 0 || max_i == p - 1 {
            // no neighborhood to fit against; emit the edge candidate
            *out = candidates.pitch[max_i];
            continue;
        }

        // normalized period coordinate centered on the winner
        let tc = 1.0 / candidates.pitch[max_i];
        let ntc = [
            ((1.0 / candidates.pitch[max_i - 1]) / tc - 1.0) * TAU,
            0.0,
            ((1.0 / candidates.pitch[max_i + 1]) / tc - 1.0) * TAU,
        ];
        let s = [
            strength[(max_i - 1, j)],
            strength[(max_i, j)],
            strength[(max_i + 1, j)],
        ];
        let coefs = poly::polyfit(&ntc, &s, 2);

        let base = candidates.log2_pitch[max_i - 1];
        let mut best_m = 0usize;
        let mut best_v = f64::NEG_INFINITY;
        for m in 0..search {
            let lf = base + m as f64 * POLYV;
            let x = ((1.0 / lf.exp2()) / tc - 1.0) * TAU;
            let v = poly::polyval(&coefs, x);
            if v > best_v {
                best_v = v;
                best_m = m;
            }
        }
        *out = (base + best_m as f64 * POLYV).exp2();
    }
    track
}
