//! Host callback contract.
//!
//! The trading bot drives a strategy through these calls: the three
//! `populate_*` stages once per new candle, and the trade callbacks for
//! every open trade.

use crate::domain::error::ScalptraderError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::policy::{OpenTrade, Snapshot, TradeSide};
use crate::domain::strategy::AnalyzedFrame;
use chrono::{DateTime, Utc};

pub trait StrategyPort: Send + Sync {
    fn name(&self) -> &str;

    fn timeframe(&self) -> &str;

    fn populate_indicators(
        &self,
        bars: &[PriceBar],
        pair: &str,
    ) -> Result<AnalyzedFrame, ScalptraderError>;

    fn populate_entry_trend(&self, frame: AnalyzedFrame, pair: &str) -> AnalyzedFrame;

    fn populate_exit_trend(&self, frame: AnalyzedFrame, pair: &str) -> AnalyzedFrame;

    /// Stop distance relative to the open rate (negative = below).
    fn custom_stoploss(
        &self,
        pair: &str,
        trade: &OpenTrade,
        current_time: DateTime<Utc>,
        current_rate: f64,
        current_profit: f64,
    ) -> f64;

    /// Leverage for a new trade, within `[1, max_leverage]`. `snapshot` is
    /// the last row of the pair's analyzed frame.
    #[allow(clippy::too_many_arguments)]
    fn leverage(
        &self,
        pair: &str,
        snapshot: &Snapshot,
        current_time: DateTime<Utc>,
        current_rate: f64,
        proposed_leverage: f64,
        max_leverage: f64,
        side: TradeSide,
    ) -> f64;

    fn check_exit_timeout(
        &self,
        pair: &str,
        trade: &OpenTrade,
        current_time: DateTime<Utc>,
        current_rate: f64,
        current_profit: f64,
    ) -> bool;
}
