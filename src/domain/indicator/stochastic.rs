//! Stochastic oscillators.
//!
//! Raw %K(n)[i] = 100 * (C[i] - LL(n)) / (HH(n) - LL(n)), 0 when HH == LL.
//!
//! - Slow stochastic: slowk = SMA(raw %K, slowk_period),
//!   slowd = SMA(slowk, slowd_period). Both outputs start on the row slowd
//!   becomes defined.
//! - Stochastic RSI: the same %K applied to RSI values (high = low = close =
//!   RSI), fastd = SMA(fastk, fastd_period). Both outputs start on the row
//!   fastd becomes defined.

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::{calculate_sma, rolling_max, rolling_min};

pub const DEFAULT_SLOWK_PERIOD: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct StochOutput {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

fn raw_k(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(high, period);
    let ll = rolling_min(low, period);

    close
        .iter()
        .zip(hh.iter().zip(&ll))
        .map(|(&c, (&h, &l))| {
            if h.is_nan() || l.is_nan() || c.is_nan() {
                f64::NAN
            } else if h - l > 0.0 {
                100.0 * (c - l) / (h - l)
            } else {
                0.0
            }
        })
        .collect()
}

/// Mask `k` to the rows where `d` is defined.
fn align(k: Vec<f64>, d: Vec<f64>) -> StochOutput {
    let k = k
        .into_iter()
        .zip(&d)
        .map(|(k, d)| if d.is_nan() { f64::NAN } else { k })
        .collect();
    StochOutput { k, d }
}

pub fn calculate_stoch(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    fastk_period: usize,
    slowk_period: usize,
    slowd_period: usize,
) -> StochOutput {
    let fastk = raw_k(high, low, close, fastk_period);
    let slowk = calculate_sma(&fastk, slowk_period);
    let slowd = calculate_sma(&slowk, slowd_period);
    align(slowk, slowd)
}

pub fn calculate_stoch_rsi(
    close: &[f64],
    rsi_period: usize,
    fastk_period: usize,
    fastd_period: usize,
) -> StochOutput {
    let rsi = calculate_rsi(close, rsi_period);
    let fastk = raw_k(&rsi, &rsi, &rsi, fastk_period);
    let fastd = calculate_sma(&fastk, fastd_period);
    align(fastk, fastd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_k_bounds_and_zero_range() {
        let high = [10.0, 12.0, 11.0, 11.0];
        let low = [8.0, 9.0, 10.0, 11.0];
        let close = [9.0, 12.0, 10.0, 11.0];
        let k = raw_k(&high, &low, &close, 2);
        assert!(k[0].is_nan());
        // HH 12, LL 8, close 12
        assert!((k[1] - 100.0).abs() < 1e-12);
        // HH 12, LL 9, close 10
        assert!((k[2] - 100.0 / 3.0).abs() < 1e-12);
        // HH 11, LL 10, close 11
        assert!((k[3] - 100.0).abs() < 1e-12);

        let flat = raw_k(&[5.0; 3], &[5.0; 3], &[5.0; 3], 2);
        assert_eq!(flat[2], 0.0);
    }

    #[test]
    fn stoch_warmup_is_combined_lookback() {
        let n = 30;
        let close: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();

        let out = calculate_stoch(&high, &low, &close, 14, 3, 3);
        let first = 14 - 1 + 3 - 1 + 3 - 1;
        for i in 0..first {
            assert!(out.k[i].is_nan() && out.d[i].is_nan(), "row {}", i);
        }
        assert!(!out.k[first].is_nan());
        assert!(!out.d[first].is_nan());
        for i in first..n {
            assert!((0.0..=100.0).contains(&out.k[i]));
            assert!((0.0..=100.0).contains(&out.d[i]));
        }
    }

    #[test]
    fn stoch_slowd_is_mean_of_slowk() {
        let close: Vec<f64> = (0..20).map(|i| 50.0 + ((i * 7) % 11) as f64).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 2.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 2.0).collect();
        let out = calculate_stoch(&high, &low, &close, 5, 3, 3);
        let i = 19;
        let expected = (out.k[17] + out.k[18] + out.k[19]) / 3.0;
        assert!((out.d[i] - expected).abs() < 1e-9);
    }

    #[test]
    fn stoch_rsi_warmup() {
        let close: Vec<f64> = (0..40).map(|i| 100.0 + ((i * 13) % 7) as f64).collect();
        let out = calculate_stoch_rsi(&close, 14, 14, 3);
        // RSI from 14, fastk from 27, fastd from 29
        assert!(out.d[28].is_nan());
        assert!(!out.d[29].is_nan());
        assert!(out.k[28].is_nan());
        assert!(!out.k[29].is_nan());
    }

    #[test]
    fn stoch_rsi_short_window_undefined() {
        let out = calculate_stoch_rsi(&[100.0, 101.0, 102.0], 14, 14, 3);
        assert!(out.d.iter().all(|v| v.is_nan()));
    }
}
