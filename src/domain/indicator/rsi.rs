//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If both averages are 0 (no movement at all): RSI = 50
//!
//! Warmup: first n rows are undefined (need n price changes to seed).

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in (period + 1)..closes.len() {
        let change = closes[i] - closes[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        out[i] = rsi_value(avg_gain, avg_loss);
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_single_value() {
        let out = calculate_rsi(&[100.0], 14);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_nan());
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let out = calculate_rsi(&closes, 14);

        assert_eq!(out.len(), 15);
        for (i, v) in out.iter().enumerate().take(14) {
            assert!(v.is_nan(), "row {} should be undefined", i);
        }
        assert!(!out[14].is_nan(), "row 14 should be defined");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let out = calculate_rsi(&closes, 14);
        assert!((out[14] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let out = calculate_rsi(&closes, 14);
        assert!(out[14].abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let out = calculate_rsi(&[100.0; 30], 14);
        for v in &out[14..] {
            assert!((v - 50.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let out = calculate_rsi(&closes, 14);
        for v in out.iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v), "RSI {} out of range", v);
        }
    }

    #[test]
    fn rsi_zero_period() {
        let out = calculate_rsi(&[100.0, 101.0], 0);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_known_calculation() {
        let closes = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let out = calculate_rsi(&closes, 14);

        // gains sum 4.0, losses sum 1.5 over 14 changes
        let expected = 100.0 * 4.0 / 5.5;
        assert!((out[14] - expected).abs() < 1e-9);
    }

    #[test]
    fn rsi_wilder_smoothing_step() {
        let closes = [10.0, 11.0, 10.0, 12.0];
        let out = calculate_rsi(&closes, 2);
        // seed: gains (1, 0) -> 0.5, losses (0, 1) -> 0.5 -> 50
        assert!((out[2] - 50.0).abs() < 1e-9);
        // next: gain 2 -> avg_gain (0.5 + 2)/2 = 1.25, avg_loss 0.25 -> RS 5
        let expected = 100.0 - 100.0 / 6.0;
        assert!((out[3] - expected).abs() < 1e-9);
    }
}
