//! JSONL Output
//!
//! Line-delimited JSON sinks for the runner: responses, persisted opinion
//! records and recommendation audits.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::warn;

/// Serializes one record per line into a buffered sink.
pub struct JsonlWriter {
    sink: Box<dyn Write>,
    lines: u64,
}

impl JsonlWriter {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            sink: Box::new(BufWriter::new(file)),
            lines: 0,
        })
    }

    /// A writer that counts records and drops them, used when the runner has
    /// no output directory.
    pub fn discard() -> Self {
        Self {
            sink: Box::new(io::sink()),
            lines: 0,
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.sink, record)?;
        self.sink.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    pub fn write_all_records<T: Serialize>(&mut self, records: &[T]) -> io::Result<()> {
        records.iter().try_for_each(|record| self.write(record))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        if let Err(error) = self.sink.flush() {
            warn!(%error, lines = self.lines, "unflushed JSONL output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed_events::{JsonlRecord, OpinionRecord, RecommendationAudit};
    use std::fs;

    #[test]
    fn test_writes_one_record_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recommendations.jsonl");

        {
            let mut writer = JsonlWriter::create(&path).unwrap();
            writer
                .write(&RecommendationAudit::new(1, 4, vec![9, 3]))
                .unwrap();
            writer
                .write_all_records(&[
                    RecommendationAudit::new(2, 4, vec![]),
                    RecommendationAudit::new(1, 5, vec![11]),
                ])
                .unwrap();
            assert_eq!(writer.lines_written(), 3);
        }

        let content = fs::read_to_string(&path).unwrap();
        let audits: Vec<RecommendationAudit> = content
            .lines()
            .map(|line| RecommendationAudit::from_jsonl(line).unwrap())
            .collect();

        assert_eq!(audits.len(), 3);
        assert_eq!(audits[0].post_ids, vec![9, 3]);
        assert!(audits[1].post_ids.is_empty());
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opinions.jsonl");
        fs::write(&path, "stale\n").unwrap();

        {
            let mut writer = JsonlWriter::create(&path).unwrap();
            writer.write(&OpinionRecord::new(1, 1, 2, 0.5)).unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_discard_counts_without_output() {
        let mut writer = JsonlWriter::discard();
        writer.write(&OpinionRecord::new(1, 1, 2, 0.5)).unwrap();
        assert_eq!(writer.lines_written(), 1);
    }
}
