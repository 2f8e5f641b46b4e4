use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::HistoryRecord;

/// Append-only CSV log of items pruned from the mixes playlist.
pub struct HistorySink {
    path: PathBuf,
}

impl HistorySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per record, writing the header only into a new or empty file.
    pub fn append(&self, records: &[HistoryRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(records.len())
    }

    pub fn read_all(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<HistoryRecord>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LiveStatus, PrivacyStatus};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record(video_id: &str, with_stats: bool) -> HistoryRecord {
        HistoryRecord {
            video_id: video_id.to_string(),
            item_id: format!("item-{video_id}"),
            release_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap()),
            status: PrivacyStatus::Public,
            channel_id: Some("UCa".to_string()),
            channel_name: Some("Channel, with comma".to_string()),
            subscribers: Some(1200),
            views: with_stats.then_some(5000),
            likes: with_stats.then_some(80),
            comments: with_stats.then_some(3),
            duration: with_stats.then_some(3600),
            live_status: with_stats.then_some(LiveStatus::None),
        }
    }

    #[test]
    fn appends_without_disturbing_prior_rows() {
        let dir = tempfile::tempdir().unwrap();
        let sink = HistorySink::new(dir.path().join("data").join("mix_history.csv"));

        assert_eq!(sink.append(&[record("a", true)]).unwrap(), 1);
        assert_eq!(
            sink.append(&[record("b", true), record("c", false)]).unwrap(),
            2
        );

        let rows = sink.read_all().unwrap();
        assert_eq!(rows, vec![record("a", true), record("b", true), record("c", false)]);

        let raw = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(raw.matches("video_id,item_id").count(), 1);
        assert_eq!(raw.lines().count(), 4);
    }

    #[test]
    fn nothing_to_append_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let sink = HistorySink::new(dir.path().join("mix_history.csv"));
        assert_eq!(sink.append(&[]).unwrap(), 0);
        assert!(!sink.path().exists());
        assert!(sink.read_all().unwrap().is_empty());
    }
}
