//! Prime-harmonic strength kernel.
//!
//! The kernel is the spectral template a candidate pitch is scored against:
//! cosine lobes at the candidate's prime-numbered harmonics (plus the
//! fundamental), inverted half-height lobes in the valleys between them,
//! and nothing at composite harmonics. Composites are left out because they
//! coincide with harmonics of subharmonic candidates and would pull the
//! score toward integer-ratio errors.

use std::f64::consts::PI;

/// Build the kernel for `pitch` over the ERB grid `ferbs`.
///
/// `primes[h]` flags harmonic `h` as participating (index 1 is always set).
/// The result is L2-normalized over its positive entries; a kernel with no
/// positive mass comes back all zero.
pub fn strength_kernel(pitch: f64, ferbs: &[f64], primes: &[bool]) -> Vec<f64> {
    let mut kernel = vec![0.0; ferbs.len()];
    let q: Vec<f64> = ferbs.iter().map(|f| f / pitch).collect();

    // highest harmonic whose peak region still reaches the grid
    let plim = (ferbs[ferbs.len() - 1] / pitch - 0.75).floor();
    let mut h = 1usize;
    while (h as f64) <= plim {
        if primes[h] {
            for (k, &qk) in q.iter().enumerate() {
                let delta = (qk - h as f64).abs();
                if delta < 0.25 {
                    // peak: overwrites any valley contribution on this bin
                    kernel[k] = (2.0 * PI * qk).cos();
                } else if delta < 0.75 {
                    // valley: accumulates across neighboring harmonics
                    kernel[k] += (2.0 * PI * qk).cos() / 2.0;
                }
            }
        }
        h += 1;
    }

    // 1/sqrt(f) envelope, then normalize by the positive-entry norm
    let mut norm = 0.0;
    for (k, v) in kernel.iter_mut().enumerate() {
        *v *= (1.0 / ferbs[k]).sqrt();
        if *v > 0.0 {
            norm += *v * *v;
        }
    }
    let norm = norm.sqrt();
    if norm > 0.0 {
        for v in &mut kernel {
            *v /= norm;
        }
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::grids::ErbGrid;
    use crate::num::primes::prime_flags;

    fn setup(rate: f64, min: f64) -> (ErbGrid, Vec<bool>) {
        let grid = ErbGrid::new(min, rate / 2.0);
        let primes = prime_flags((grid.top() / min).ceil() as usize);
        (grid, primes)
    }

    #[test]
    fn test_positive_entries_have_unit_norm() {
        let (grid, primes) = setup(16000.0, 100.0);
        for pitch in [100.0, 171.3, 440.0, 599.0] {
            let k = strength_kernel(pitch, &grid.freqs, &primes);
            let pos: f64 = k.iter().filter(|&&v| v > 0.0).map(|v| v * v).sum();
            assert!((pos - 1.0).abs() < 1e-9, "pitch {pitch}: norm {pos}");
        }
    }

    #[test]
    fn test_peaks_sit_on_prime_harmonics() {
        let (grid, primes) = setup(16000.0, 100.0);
        let pitch = 200.0;
        let k = strength_kernel(pitch, &grid.freqs, &primes);
        // bins nearest the 1st, 2nd, 3rd, 5th harmonics carry positive weight
        for h in [1.0, 2.0, 3.0, 5.0] {
            let target = pitch * h;
            let (bin, _) = grid
                .freqs
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    (a.1 - target)
                        .abs()
                        .partial_cmp(&(b.1 - target).abs())
                        .unwrap()
                })
                .unwrap();
            assert!(k[bin] > 0.0, "harmonic {h} at bin {bin}: {}", k[bin]);
        }
    }

    #[test]
    fn test_composite_harmonics_carry_no_peak() {
        let (grid, primes) = setup(16000.0, 100.0);
        let pitch = 150.0;
        let k = strength_kernel(pitch, &grid.freqs, &primes);
        // the 4th harmonic is composite: its neighborhood is valley-only
        for (bin, &f) in grid.freqs.iter().enumerate() {
            let q = f / pitch;
            if (q - 4.0).abs() < 0.2 {
                assert!(k[bin] <= 0.0, "bin {bin} (q = {q}) has weight {}", k[bin]);
            }
        }
    }

    #[test]
    fn test_kernel_zero_above_top_harmonic() {
        let (grid, primes) = setup(16000.0, 100.0);
        let k = strength_kernel(100.0, &grid.freqs, &primes);
        assert!(k.iter().any(|&v| v != 0.0));
        // a candidate near Nyquist has no harmonics on the grid at all
        let high = strength_kernel(7999.0, &grid.freqs, &primes);
        assert!(high.iter().all(|&v| v == 0.0));
    }
}
