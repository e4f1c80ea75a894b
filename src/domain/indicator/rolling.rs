//! Trailing rolling mean over an indicator column.
//!
//! MEAN(n)[i] = sum(X[i-j] for j in 0..n) / n
//! Warmup: the first (n-1) rows are NaN, and any NaN inside the window makes
//! the result NaN.

/// Rolling mean ending at `index`. NaN until the window is full.
pub fn rolling_mean_at(values: &[f64], window: usize, index: usize) -> f64 {
    if window == 0 || index >= values.len() || index + 1 < window {
        return f64::NAN;
    }

    let start = index + 1 - window;
    let slice = &values[start..=index];
    if slice.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }

    slice.iter().sum::<f64>() / window as f64
}
