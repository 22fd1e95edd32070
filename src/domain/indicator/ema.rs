//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n defined inputs, then
//! EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Warmup: leading undefined inputs plus (n-1) rows are undefined.

pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    let start = match values.iter().position(|v| !v.is_nan()) {
        Some(s) => s,
        None => return out,
    };
    let seed_index = start + period - 1;
    if seed_index >= values.len() {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed_window = &values[start..=seed_index];
    if seed_window.iter().any(|v| v.is_nan()) {
        return out;
    }
    let mut ema = seed_window.iter().sum::<f64>() / period as f64;
    out[seed_index] = ema;

    for i in (seed_index + 1)..values.len() {
        if values[i].is_nan() {
            continue;
        }
        ema = values[i] * k + ema * (1.0 - k);
        out[i] = ema;
    }

    out
}
