//! Signal report port trait.

use crate::domain::error::ScalptraderError;
use crate::domain::strategy::AnalyzedFrame;

/// Output path that means standard output.
pub const STDOUT: &str = "-";

/// Port for writing analyzed frames.
pub trait ReportPort {
    fn write(&self, frame: &AnalyzedFrame, output_path: &str) -> Result<(), ScalptraderError>;

    /// Default implementation: one `write` per frame, suffixing the pair to
    /// the path. Standard output is never suffixed; frames follow each other.
    fn write_all(&self, frames: &[AnalyzedFrame], output_path: &str) -> Result<(), ScalptraderError> {
        if let [frame] = frames {
            return self.write(frame, output_path);
        }
        for frame in frames {
            if output_path == STDOUT {
                self.write(frame, STDOUT)?;
                continue;
            }
            let path = format!("{}.{}", output_path, frame.pair.replace('/', "_"));
            self.write(frame, &path)?;
        }
        Ok(())
    }
}
