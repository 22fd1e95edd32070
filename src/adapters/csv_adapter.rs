//! CSV file price data adapter.
//!
//! One file per pair in a base directory, named after the pair with `/`
//! replaced by `_` (`BTC/USDT` → `BTC_USDT.csv`). Columns are
//! `date,open,high,low,close,volume`; dates are RFC 3339, `YYYY-MM-DD
//! HH:MM:SS` (UTC) or epoch milliseconds. Rows are returned in file order;
//! ordering is validated downstream.

use crate::domain::error::ScalptraderError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, pair: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", pair.replace('/', "_")))
    }
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ScalptraderError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(millis) = raw.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp_millis(millis) {
            return Ok(dt);
        }
    }
    Err(ScalptraderError::Data {
        reason: format!("invalid date '{}'", raw),
    })
}

fn field(record: &csv::StringRecord, index: usize, name: &str, row: usize) -> Result<f64, ScalptraderError> {
    record
        .get(index)
        .ok_or_else(|| ScalptraderError::Data {
            reason: format!("row {}: missing {} column", row, name),
        })?
        .trim()
        .parse()
        .map_err(|e| ScalptraderError::Data {
            reason: format!("row {}: invalid {} value: {}", row, name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, pair: &str) -> Result<Vec<PriceBar>, ScalptraderError> {
        let path = self.csv_path(pair);
        let content = fs::read_to_string(&path).map_err(|e| ScalptraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| ScalptraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| ScalptraderError::Data {
                reason: format!("row {}: missing date column", row),
            })?;

            bars.push(PriceBar {
                timestamp: parse_timestamp(date_str)?,
                open: field(&record, 1, "open", row)?,
                high: field(&record, 2, "high", row)?,
                low: field(&record, 3, "low", row)?,
                close: field(&record, 4, "close", row)?,
                volume: field(&record, 5, "volume", row)?,
            });
        }

        Ok(bars)
    }

    fn list_pairs(&self) -> Result<Vec<String>, ScalptraderError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut pairs = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                pairs.push(stem.replace('_', "/"));
            }
        }

        pairs.sort();
        Ok(pairs)
    }
}
