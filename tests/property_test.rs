//! Property tests for indicator and pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Heikin-Ashi recursion holds exactly on every row
//! 2. Oscillators stay inside their documented ranges
//! 3. Full pipeline runs are reproducible bit for bit
//! 4. Classic longs never fire without a resistance breakout
//! 5. The profit lock never loosens while profit stays above activation

mod common;

use common::{make_bar, PriceBar};
use proptest::prelude::*;
use scalptrader::domain::indicator::heikin_ashi::calculate_heikin_ashi;
use scalptrader::domain::indicator::rsi::calculate_rsi;
use scalptrader::domain::indicator::stochastic::{calculate_stoch, calculate_stoch_rsi};
use scalptrader::domain::indicator::williams_r::calculate_williams_r;
use scalptrader::domain::indicator::Column;
use scalptrader::domain::ohlcv::Candles;
use scalptrader::domain::policy::StoplossPolicy;
use scalptrader::domain::presets::{self, advanced_scalp, classic, NAMES};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random walk candles with consistent wicks.
fn arb_bars(min: usize, max: usize) -> impl Strategy<Value = Vec<PriceBar>> {
    prop::collection::vec((-2.0..2.0_f64, 0.0..1.5_f64, 0.0..1.5_f64), min..max).prop_map(
        |steps| {
            let mut price = 100.0;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (step, up, down))| {
                    let open = price;
                    let close = (price + step).max(1.0);
                    price = close;
                    make_bar(
                        i as i64,
                        open,
                        open.max(close) + up,
                        open.min(close) - down,
                        close,
                    )
                })
                .collect()
        },
    )
}

fn in_range(values: &[f64], low: f64, high: f64) -> bool {
    values
        .iter()
        .filter(|v| !v.is_nan())
        .all(|v| *v >= low - 1e-9 && *v <= high + 1e-9)
}

// ── 1. Heikin-Ashi ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn heikin_ashi_recursion_exact(bars in arb_bars(1, 120)) {
        let candles = Candles::from_bars(&bars).unwrap();
        let ha = calculate_heikin_ashi(&candles);

        for i in 0..candles.len() {
            let (o, h, l, c) = (candles.open[i], candles.high[i], candles.low[i], candles.close[i]);
            let expected_open = if i == 0 {
                (o + c) / 2.0
            } else {
                (ha.open[i - 1] + ha.close[i - 1]) / 2.0
            };
            prop_assert_eq!(ha.open[i], expected_open);
            prop_assert_eq!(ha.close[i], (o + h + l + c) / 4.0);
            prop_assert_eq!(ha.high[i], h.max(ha.open[i]).max(ha.close[i]));
            prop_assert_eq!(ha.low[i], l.min(ha.open[i]).min(ha.close[i]));
        }
    }
}

// ── 2. Oscillator ranges ─────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_within_bounds(bars in arb_bars(1, 150), period in 2usize..30) {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let rsi = calculate_rsi(&closes, period);
        prop_assert_eq!(rsi.len(), closes.len());
        prop_assert!(in_range(&rsi, 0.0, 100.0));
        for v in rsi.iter().take(period.min(closes.len())) {
            prop_assert!(v.is_nan());
        }
    }

    #[test]
    fn williams_r_within_bounds(bars in arb_bars(1, 150), period in 2usize..30) {
        let candles = Candles::from_bars(&bars).unwrap();
        let out = calculate_williams_r(&candles.high, &candles.low, &candles.close, period);
        prop_assert!(in_range(&out, -100.0, 0.0));
    }

    #[test]
    fn stochastics_within_bounds(bars in arb_bars(1, 150), k in 3usize..15, d in 2usize..5) {
        let candles = Candles::from_bars(&bars).unwrap();
        let slow = calculate_stoch(&candles.high, &candles.low, &candles.close, k, 3, d);
        prop_assert!(in_range(&slow.k, 0.0, 100.0));
        prop_assert!(in_range(&slow.d, 0.0, 100.0));

        let fast = calculate_stoch_rsi(&candles.close, 14, k, d);
        prop_assert!(in_range(&fast.k, 0.0, 100.0));
        prop_assert!(in_range(&fast.d, 0.0, 100.0));
        for (k, d) in fast.k.iter().zip(&fast.d) {
            prop_assert_eq!(k.is_nan(), d.is_nan());
        }
    }
}

// ── 3. Reproducibility ───────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn pipeline_is_deterministic(bars in arb_bars(1, 260), which in 0usize..3) {
        let strategy = presets::by_name(NAMES[which]).unwrap();
        let a = strategy.analyze(&bars, "BTC/USDT").unwrap();
        let b = strategy.analyze(&bars, "BTC/USDT").unwrap();
        prop_assert!(a.bit_eq(&b));
        prop_assert_eq!(a.signals.len(), bars.len());
    }

    #[test]
    fn first_row_never_signals_on_shifted_rules(bars in arb_bars(1, 260)) {
        for name in [classic::NAME, advanced_scalp::NAME] {
            let strategy = presets::by_name(name).unwrap();
            let frame = strategy.analyze(&bars, "BTC/USDT").unwrap();
            let row = &frame.signals[0];
            prop_assert!(!row.enter_long && !row.enter_short);
        }
    }
}

// ── 4. Resistance gate ───────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn classic_long_requires_breakout(bars in arb_bars(40, 260), window in 15i64..50) {
        let strategy = presets::by_name(classic::NAME)
            .unwrap()
            .with_overrides([("resistance_period", window.to_string().as_str())])
            .unwrap();
        let frame = strategy.analyze(&bars, "BTC/USDT").unwrap();
        let resistance = frame.indicators.series(Column::Resistance).unwrap();

        for i in 0..frame.len() {
            let prev = i.checked_sub(1).and_then(|p| resistance.get(p));
            if !prev.is_some_and(|r| frame.candles.close[i] > r) {
                prop_assert!(!frame.signals[i].enter_long);
            }
        }
    }
}

// ── 5. Profit lock ratchet ───────────────────────────────────────────

proptest! {
    #[test]
    fn profit_lock_holds_once_activated(
        profits in prop::collection::vec(0.01..0.2_f64, 1..40),
        base in -0.1..-0.01_f64,
    ) {
        let policy = StoplossPolicy::ProfitLock { base, activation: 0.01, locked: 0.01 };
        let mut tightest = f64::NEG_INFINITY;
        for profit in profits {
            let stop = policy.stoploss(profit);
            prop_assert!(stop >= tightest);
            tightest = tightest.max(stop);
        }
    }
}
