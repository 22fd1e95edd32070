//! Heikin-Ashi candle transform.
//!
//! HA_close[i] = (O[i] + H[i] + L[i] + C[i]) / 4
//! HA_open[0]  = (O[0] + C[0]) / 2
//! HA_open[i]  = (HA_open[i-1] + HA_close[i-1]) / 2
//! HA_high[i]  = max(H[i], HA_open[i], HA_close[i])
//! HA_low[i]   = min(L[i], HA_open[i], HA_close[i])
//!
//! No warmup: every row is defined.

use crate::domain::ohlcv::Candles;

#[derive(Debug, Clone, PartialEq)]
pub struct HeikinAshi {
    pub open: Vec<f64>,
    pub close: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
}

impl HeikinAshi {
    /// HA_close > HA_open
    pub fn bullish(&self) -> Vec<bool> {
        self.close.iter().zip(&self.open).map(|(c, o)| c > o).collect()
    }

    /// HA_close < HA_open
    pub fn bearish(&self) -> Vec<bool> {
        self.close.iter().zip(&self.open).map(|(c, o)| c < o).collect()
    }
}

pub fn calculate_heikin_ashi(candles: &Candles) -> HeikinAshi {
    let n = candles.len();
    let mut ha = HeikinAshi {
        open: Vec::with_capacity(n),
        close: Vec::with_capacity(n),
        high: Vec::with_capacity(n),
        low: Vec::with_capacity(n),
    };

    for i in 0..n {
        let (o, h, l, c) = (
            candles.open[i],
            candles.high[i],
            candles.low[i],
            candles.close[i],
        );
        let ha_close = (o + h + l + c) / 4.0;
        let ha_open = if i == 0 {
            (o + c) / 2.0
        } else {
            (ha.open[i - 1] + ha.close[i - 1]) / 2.0
        };

        ha.open.push(ha_open);
        ha.close.push(ha_close);
        ha.high.push(h.max(ha_open).max(ha_close));
        ha.low.push(l.min(ha_open).min(ha_close));
    }

    ha
}
