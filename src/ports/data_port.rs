//! Price data access port trait.

use crate::domain::error::ScalptraderError;
use crate::domain::ohlcv::PriceBar;

pub trait DataPort {
    /// Bars for `pair`, oldest first.
    fn fetch_bars(&self, pair: &str) -> Result<Vec<PriceBar>, ScalptraderError>;

    fn list_pairs(&self) -> Result<Vec<String>, ScalptraderError>;
}
