//! Strength-matrix assembly across the window ladder.
//!
//! Each ladder rung contributes to the candidates whose fractional window
//! index `d` falls within one rung of it, weighted triangularly, with the
//! rung's frame times linearly resampled onto the common output grid. The
//! first and last rungs additionally absorb every candidate hanging off
//! their end of the ladder. Accumulation order is fixed (rung, then output
//! frame, then candidate) so results are bit-reproducible.

use crate::num::{bisect, Matrix};

use super::kernel::strength_kernel;

/// Accumulate one rung's contribution into the global strength matrix.
///
/// * `strength` - global `(candidates x output frames)` matrix, updated in
///   place
/// * `loud` - loudness matrix for this rung's window size
/// * `pitches` / `d` - full candidate grid and its window-assignment map
/// * `step` - rung index; `last` marks the final rung
/// * `hop_time` - seconds between loudness frames (`w/2 / rate`)
/// * `dt` - output time step
#[allow(clippy::too_many_arguments)]
pub fn accumulate_window(
    strength: &mut Matrix,
    loud: &Matrix,
    ferbs: &[f64],
    pitches: &[f64],
    d: &[f64],
    primes: &[bool],
    step: usize,
    last: bool,
    hop_time: f64,
    dt: f64,
) {
    // candidate slice influenced by this rung; the boundary rungs also own
    // everything beyond their end of the ladder
    let (lo, hi) = if step == 0 {
        (0, bisect(d, 2.0))
    } else if last {
        (bisect(d, step as f64), d.len())
    } else {
        (bisect(d, step as f64), bisect(d, (step + 2) as f64))
    };
    if lo >= hi {
        return;
    }
    let center = (step + 1) as f64;

    // kernel-vs-loudness inner products on this rung's own time axis
    let frames = loud.rows();
    let mut local = Matrix::zeros(hi - lo, frames);
    for (i, idx) in (lo..hi).enumerate() {
        let kernel = strength_kernel(pitches[idx], ferbs, primes);
        for j in 0..frames {
            let row = loud.row(j);
            let mut dot = 0.0;
            for (kv, lv) in kernel.iter().zip(row) {
                dot += kv * lv;
            }
            local[(i, j)] = dot;
        }
    }

    // resample onto the output grid; the frame cursor only ever advances
    let mut frame = 0usize;
    let mut frame_time = 0.0;
    for j in 0..strength.cols() {
        let t = j as f64 * dt;
        while t >= frame_time && frame < frames - 1 {
            frame += 1;
            frame_time += hop_time;
        }
        // t sits in ((frame-1)*hop_time, frame*hop_time]; back <= 0
        let back = t - frame_time;
        for (i, idx) in (lo..hi).enumerate() {
            let a = local[(i, frame)];
            let b = local[(i, frame - 1)];
            let interp = a + back * ((a - b) / hop_time);
            let mu = 1.0 - (d[idx] - center).abs();
            strength[(idx, j)] += mu * interp;
        }
    }
}
