//! Williams %R.
//!
//! %R(n)[i] = -100 * (HH(n) - C[i]) / (HH(n) - LL(n)), 0 when HH == LL.
//! Range [-100, 0]. Warmup: first (n-1) rows are undefined.

use crate::domain::indicator::{rolling_max, rolling_min};

pub fn calculate_williams_r(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(high, period);
    let ll = rolling_min(low, period);

    close
        .iter()
        .zip(hh.iter().zip(&ll))
        .map(|(&c, (&h, &l))| {
            if h.is_nan() || l.is_nan() {
                f64::NAN
            } else if h - l > 0.0 {
                -100.0 * (h - c) / (h - l)
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn williams_r_range() {
        let high = [10.0, 11.0, 12.0, 11.5, 12.5];
        let low = [9.0, 10.0, 11.0, 10.5, 11.5];
        let close = [9.5, 10.5, 11.5, 11.0, 12.0];

        let out = calculate_williams_r(&high, &low, &close, 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        for v in out.iter().filter(|v| !v.is_nan()) {
            assert!((-100.0..=0.0).contains(v));
        }
    }

    #[test]
    fn williams_r_known_values() {
        let high = [10.0, 12.0, 11.0];
        let low = [8.0, 9.0, 10.0];
        let close = [9.0, 12.0, 10.0];
        let out = calculate_williams_r(&high, &low, &close, 2);
        // HH 12, LL 8, close 12 -> 0
        assert!(out[1].abs() < 1e-12);
        // HH 12, LL 9, close 10 -> -100 * 2 / 3
        assert!((out[2] + 200.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn williams_r_flat_is_zero() {
        let out = calculate_williams_r(&[5.0; 4], &[5.0; 4], &[5.0; 4], 3);
        assert_eq!(out[3], 0.0);
    }

    #[test]
    fn williams_r_short_window() {
        let out = calculate_williams_r(&[1.0], &[1.0], &[1.0], 14);
        assert!(out[0].is_nan());
    }
}
