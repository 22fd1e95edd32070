//! CSV signal report adapter.
//!
//! One row per candle: raw prices, every indicator column present in the
//! frame, the HA flags, the four signals as 0/1 and the fired block names.
//! Undefined values are written as empty cells. An output path of `-`
//! writes to stdout; several frames sent there are each preceded by a
//! `# PAIR` line.

use crate::domain::error::ScalptraderError;
use crate::domain::indicator::{Column, Flag};
use crate::domain::strategy::AnalyzedFrame;
use crate::ports::report_port::{ReportPort, STDOUT};
use std::fs::File;
use std::io::{self, Write};

pub struct CsvReportAdapter;

const FLAGS: [Flag; 2] = [Flag::HaBullish, Flag::HaBearish];

fn csv_error(e: csv::Error) -> ScalptraderError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => ScalptraderError::Io(io),
        other => ScalptraderError::Data {
            reason: format!("CSV write error: {:?}", other),
        },
    }
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn bit(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

impl CsvReportAdapter {
    pub fn write_to<W: Write>(&self, frame: &AnalyzedFrame, out: W) -> Result<(), ScalptraderError> {
        let columns: Vec<Column> = frame.indicators.columns();
        let flags: Vec<Flag> = FLAGS
            .into_iter()
            .filter(|f| frame.indicators.has_flag(*f))
            .collect();

        let mut wtr = csv::Writer::from_writer(out);

        let mut header: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        header.extend(columns.iter().map(|c| c.to_string()));
        header.extend(flags.iter().map(|f| f.to_string()));
        header.extend(
            [
                "enter_long",
                "enter_short",
                "exit_long",
                "exit_short",
                "enter_tag",
                "exit_tag",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        wtr.write_record(&header).map_err(csv_error)?;

        let candles = &frame.candles;
        for i in 0..frame.len() {
            let mut record: Vec<String> = vec![
                candles.timestamps[i].to_rfc3339(),
                candles.open[i].to_string(),
                candles.high[i].to_string(),
                candles.low[i].to_string(),
                candles.close[i].to_string(),
                candles.volume[i].to_string(),
            ];
            record.extend(columns.iter().map(|c| number(frame.indicators.value(*c, i))));
            record.extend(
                flags
                    .iter()
                    .map(|f| bit(frame.indicators.flag(*f, i)).to_string()),
            );
            let signal = frame.signals.get(i).cloned().unwrap_or_default();
            record.extend([
                bit(signal.enter_long).to_string(),
                bit(signal.enter_short).to_string(),
                bit(signal.exit_long).to_string(),
                bit(signal.exit_short).to_string(),
                signal.enter_tags.join(","),
                signal.exit_tags.join(","),
            ]);
            wtr.write_record(&record).map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Writes several frames into one stream, each table under its pair line.
    pub fn write_all_to<W: Write>(
        &self,
        frames: &[AnalyzedFrame],
        mut out: W,
    ) -> Result<(), ScalptraderError> {
        for frame in frames {
            writeln!(out, "# {}", frame.pair)?;
            self.write_to(frame, &mut out)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, frame: &AnalyzedFrame, output_path: &str) -> Result<(), ScalptraderError> {
        if output_path == STDOUT {
            let stdout = io::stdout();
            return self.write_to(frame, stdout.lock());
        }
        let file = File::create(output_path)?;
        self.write_to(frame, file)
    }

    fn write_all(&self, frames: &[AnalyzedFrame], output_path: &str) -> Result<(), ScalptraderError> {
        match frames {
            [frame] => self.write(frame, output_path),
            _ if output_path == STDOUT => {
                let stdout = io::stdout();
                self.write_all_to(frames, stdout.lock())
            }
            _ => {
                for frame in frames {
                    let path = format!("{}.{}", output_path, frame.pair.replace('/', "_"));
                    self.write(frame, &path)?;
                }
                Ok(())
            }
        }
    }
}
