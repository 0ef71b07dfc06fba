use std::fs::{self, File};
use std::path::PathBuf;

use crate::Result;

/// Where per-episode metric rows go
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MetricsTarget {
    /// No sink; rows are discarded
    #[default]
    Disabled,
    /// `outputs/<label>.csv`, with spaces in the label replaced by underscores
    File,
    /// An in-memory buffer returned when the run completes
    Memory,
}

enum SinkWriter {
    File(csv::Writer<File>),
    Memory(csv::Writer<Vec<u8>>),
}

/// Formats and persists one CSV row per episode
pub struct MetricsSink {
    writer: Option<SinkWriter>,
}

fn file_path(label: &str) -> PathBuf {
    PathBuf::from("outputs").join(format!("{}.csv", label.replace(' ', "_")))
}

impl MetricsSink {
    /// Open a sink for `target`, writing the header row immediately
    pub fn open(target: MetricsTarget, label: &str, headers: &[&str]) -> Result<Self> {
        let writer = match target {
            MetricsTarget::Disabled => None,
            MetricsTarget::File => {
                fs::create_dir_all("outputs")?;
                let mut wtr = csv::Writer::from_path(file_path(label))?;
                wtr.write_record(headers)?;
                Some(SinkWriter::File(wtr))
            }
            MetricsTarget::Memory => {
                let mut wtr = csv::Writer::from_writer(Vec::new());
                wtr.write_record(headers)?;
                Some(SinkWriter::Memory(wtr))
            }
        };
        Ok(Self { writer })
    }

    /// Append one row; a no-op when the sink is disabled
    pub fn record(&mut self, row: &[String]) -> Result<()> {
        match &mut self.writer {
            Some(SinkWriter::File(wtr)) => wtr.write_record(row)?,
            Some(SinkWriter::Memory(wtr)) => wtr.write_record(row)?,
            None => {}
        }
        Ok(())
    }

    /// Flush and close, returning the buffered CSV text for the memory target
    pub fn finish(self) -> Result<Option<String>> {
        match self.writer {
            Some(SinkWriter::File(mut wtr)) => {
                wtr.flush()?;
                Ok(None)
            }
            Some(SinkWriter::Memory(wtr)) => {
                let buf = wtr
                    .into_inner()
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.error().to_string()))?;
                Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_spaces_become_underscores() {
        assert_eq!(
            file_path("my test run"),
            PathBuf::from("outputs/my_test_run.csv")
        );
    }

    #[test]
    fn memory_sink_returns_csv_text() {
        let headers = ["Episode", "Steps", "Total_Reward", "Outcome"];
        let mut sink = MetricsSink::open(MetricsTarget::Memory, "t", &headers).unwrap();
        sink.record(&[
            "0".to_string(),
            "5".to_string(),
            "1.00".to_string(),
            "G".to_string(),
        ])
        .unwrap();
        let out = sink.finish().unwrap().unwrap();
        assert_eq!(out, "Episode,Steps,Total_Reward,Outcome\n0,5,1.00,G\n");
    }

    #[test]
    fn disabled_sink_discards_rows() {
        let mut sink = MetricsSink::open(MetricsTarget::Disabled, "t", &["a"]).unwrap();
        sink.record(&["1".to_string()]).unwrap();
        assert_eq!(sink.finish().unwrap(), None);
    }
}
