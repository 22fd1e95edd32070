//! Parabolic SAR (Wilder acceleration factor system).
//!
//! Inherently sequential/stateful: maintains direction, extreme point (EP),
//! and acceleration factor (AF). The acceleration parameter is both the
//! starting AF and the per-new-extreme step, capped at `maximum`.
//!
//! Initial direction comes from the directional movement of the first two
//! bars (short only when the down move is positive and larger than the up
//! move). The SAR never penetrates the previous two bars' range, and on a
//! reversal it restarts at the prior extreme point.
//!
//! Warmup: row 0 is undefined.

pub const DEFAULT_ACCELERATION: f64 = 0.02;
pub const DEFAULT_MAXIMUM: f64 = 0.2;

pub fn calculate_sar(high: &[f64], low: &[f64], acceleration: f64, maximum: f64) -> Vec<f64> {
    let n = high.len().min(low.len());
    let mut out = vec![f64::NAN; n];
    if n < 2 || acceleration <= 0.0 {
        return out;
    }
    let maximum = maximum.max(acceleration);

    let minus_dm = low[0] - low[1];
    let plus_dm = high[1] - high[0];
    let mut is_long = !(minus_dm > 0.0 && plus_dm < minus_dm);

    let mut af = acceleration;
    let (mut ep, mut sar) = if is_long {
        (high[1], low[0])
    } else {
        (low[1], high[0])
    };

    let mut new_high = high[1];
    let mut new_low = low[1];

    for today in 1..n {
        let prev_high = new_high;
        let prev_low = new_low;
        new_high = high[today];
        new_low = low[today];

        if is_long {
            if new_low <= sar {
                is_long = false;
                sar = ep.max(prev_high).max(new_high);
                out[today] = sar;

                af = acceleration;
                ep = new_low;
                sar += af * (ep - sar);
                sar = sar.max(prev_high).max(new_high);
            } else {
                out[today] = sar;

                if new_high > ep {
                    ep = new_high;
                    af = (af + acceleration).min(maximum);
                }
                sar += af * (ep - sar);
                sar = sar.min(prev_low).min(new_low);
            }
        } else if new_high >= sar {
            is_long = true;
            sar = ep.min(prev_low).min(new_low);
            out[today] = sar;

            af = acceleration;
            ep = new_high;
            sar += af * (ep - sar);
            sar = sar.min(prev_low).min(new_low);
        } else {
            out[today] = sar;

            if new_low < ep {
                ep = new_low;
                af = (af + acceleration).min(maximum);
            }
            sar += af * (ep - sar);
            sar = sar.max(prev_high).max(new_high);
        }
    }

    out
}
