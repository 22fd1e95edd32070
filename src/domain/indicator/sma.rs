//! Simple Moving Average and rolling extremes.
//!
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Warmup: first (n-1) rows are undefined. A window containing an undefined
//! input is itself undefined; inputs are never zero filled.

/// Trailing mean over `period` values.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    let mut sum = 0.0;
    let mut defined_run = 0usize;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            sum = 0.0;
            defined_run = 0;
            continue;
        }
        sum += v;
        defined_run += 1;
        if defined_run > period {
            sum -= values[i - period];
        }
        if defined_run >= period {
            out[i] = sum / period as f64;
        }
    }

    out
}

/// Trailing maximum over `window` values.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_fold(values, window, f64::NEG_INFINITY, f64::max)
}

/// Trailing minimum over `window` values.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_fold(values, window, f64::INFINITY, f64::min)
}

fn rolling_fold(values: &[f64], window: usize, init: f64, f: fn(f64, f64) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = slice.iter().copied().fold(init, f);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_warmup() {
        let out = calculate_sma(&[10.0, 20.0, 30.0, 40.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!((out[2] - 20.0).abs() < 1e-12);
        assert!((out[3] - 30.0).abs() < 1e-12);
    }

    #[test]
    fn sma_period_1_is_identity() {
        let out = calculate_sma(&[3.0, 4.0], 1);
        assert_eq!(out, vec![3.0, 4.0]);
    }

    #[test]
    fn sma_shorter_than_period_all_undefined() {
        let out = calculate_sma(&[1.0, 2.0], 5);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_skips_leading_undefined() {
        let out = calculate_sma(&[f64::NAN, f64::NAN, 2.0, 4.0, 6.0], 2);
        assert!(out[2].is_nan());
        assert!((out[3] - 3.0).abs() < 1e-12);
        assert!((out[4] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn sma_zero_period() {
        let out = calculate_sma(&[1.0, 2.0], 0);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_max_window() {
        let out = rolling_max(&[1.0, 5.0, 3.0, 2.0, 4.0], 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert_eq!(&out[2..], &[5.0, 5.0, 4.0]);
    }

    #[test]
    fn rolling_min_window() {
        let out = rolling_min(&[1.0, 5.0, 3.0, 2.0, 4.0], 2);
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &[1.0, 3.0, 2.0, 2.0]);
    }

    #[test]
    fn rolling_window_with_undefined_input() {
        let out = rolling_max(&[f64::NAN, 2.0, 3.0], 2);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 3.0);
    }
}
