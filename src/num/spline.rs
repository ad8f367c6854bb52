//! Cubic spline interpolation over an ascending knot grid.
//!
//! Split into a per-curve setup pass ([`slopes_into`], the tridiagonal sweep
//! producing second derivatives) and a per-point query ([`eval`]) so the
//! loudness analyzer can re-fit one curve per frame into preallocated
//! scratch without touching the allocator.

/// Boundary first-derivative used at both ends of every spline.
///
/// SWIPE' fixes the end slopes at 2.0 instead of using natural
/// (zero-curvature) ends; interpolated loudness, and therefore every test
/// vector downstream, depends on this exact value.
const END_SLOPE: f64 = 2.0;

/// Fill `y2` with the spline second derivatives for the curve `(x, y)`.
///
/// `u` is caller-provided scratch. All four slices must have the same
/// length, at least 2.
pub fn slopes_into(x: &[f64], y: &[f64], u: &mut [f64], y2: &mut [f64]) {
    let n = x.len();
    debug_assert!(n >= 2 && y.len() == n && u.len() >= n - 1 && y2.len() == n);

    y2[0] = -0.5;
    u[0] = (3.0 / (x[1] - x[0])) * ((y[1] - y[0]) / (x[1] - x[0]) - END_SLOPE);
    for i in 1..n - 1 {
        let sig = (x[i] - x[i - 1]) / (x[i + 1] - x[i - 1]);
        let p = sig * y2[i - 1] + 2.0;
        y2[i] = (sig - 1.0) / p;
        let d = (y[i + 1] - y[i]) / (x[i + 1] - x[i]) - (y[i] - y[i - 1]) / (x[i] - x[i - 1]);
        u[i] = (6.0 * d / (x[i + 1] - x[i - 1]) - sig * u[i - 1]) / p;
    }
    let qn = 0.5;
    let un = (3.0 / (x[n - 1] - x[n - 2]))
        * (END_SLOPE - (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]));
    y2[n - 1] = (un - qn * u[n - 2]) / (qn * y2[n - 2] + 1.0);
    for k in (0..n - 1).rev() {
        y2[k] = y2[k] * y2[k + 1] + u[k];
    }
}

/// Convenience wrapper around [`slopes_into`] that allocates its buffers.
pub fn slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let mut u = vec![0.0; x.len()];
    let mut y2 = vec![0.0; x.len()];
    slopes_into(x, y, &mut u, &mut y2);
    y2
}

/// Evaluate the spline `(x, y, y2)` at `val`.
///
/// `hi` is the bracketing index from a prior [`crate::num::bisect`] (or
/// [`crate::num::bisect_from`]) call; it is clamped so queries past the top
/// knot extrapolate along the last polynomial piece.
pub fn eval(x: &[f64], y: &[f64], y2: &[f64], val: f64, hi: usize) -> f64 {
    let hi = hi.min(x.len() - 1);
    let lo = hi - 1;
    let h = x[hi] - x[lo];
    let a = (x[hi] - val) / h;
    let b = 1.0 - a;
    a * y[lo]
        + b * y[hi]
        + ((a * a * a - a) * y2[lo] + (b * b * b - b) * y2[hi]) * (h * h) / 6.0
}
