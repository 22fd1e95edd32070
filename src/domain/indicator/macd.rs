//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded on its first defined values
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 rows. All three outputs share the
//! same first defined row, like the TA-Lib reference.

use crate::domain::indicator::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdOutput {
    let n = closes.len();
    let undefined = || vec![f64::NAN; n];
    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdOutput {
            macd: undefined(),
            signal: undefined(),
            histogram: undefined(),
        };
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = calculate_ema(&line, signal_period);

    let mut macd = undefined();
    let mut histogram = undefined();
    for i in 0..n {
        if signal[i].is_nan() {
            continue;
        }
        macd[i] = line[i];
        histogram[i] = line[i] - signal[i];
    }

    MacdOutput {
        macd,
        signal,
        histogram,
    }
}
