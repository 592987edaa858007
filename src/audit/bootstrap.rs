//! Bootstrap confidence intervals
//!
//! Resampling-based interval around the mean of a handful of group-level
//! point estimates. This quantifies variability due to having only a few
//! groups, not per-row sampling variability; an intentional
//! simplification that keeps the estimator generic.

use rand::Rng;

/// Bootstrap confidence interval for the mean of `values`.
///
/// Draws `n_bootstrap` same-size resamples with replacement, takes the
/// mean of each, and reports the `(alpha/2, 100 - alpha/2)` percentile
/// pair of the resample-mean distribution, where `alpha = 100 - ci_level`.
/// Bounds are rounded to 4 decimals. Returns `None` on empty input.
pub fn bootstrap_ci<R: Rng>(
    values: &[f64],
    n_bootstrap: usize,
    ci_level: f64,
    rng: &mut R,
) -> Option<(f64, f64)> {
    if values.is_empty() || n_bootstrap == 0 {
        return None;
    }

    let n = values.len();
    let mut means = Vec::with_capacity(n_bootstrap);
    for _ in 0..n_bootstrap {
        let sum: f64 = (0..n).map(|_| values[rng.gen_range(0..n)]).sum();
        means.push(sum / n as f64);
    }
    means.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let alpha = (100.0 - ci_level) / 2.0;
    let lower = percentile(&means, alpha);
    let upper = percentile(&means, 100.0 - alpha);

    Some((round4(lower), round4(upper)))
}

/// Linear-interpolation percentile over a sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
