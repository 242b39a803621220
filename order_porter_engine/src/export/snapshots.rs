use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use log::*;
use serde::{Deserialize, Serialize};
use vivid_tools::OrderRecord;

use crate::{
    export::{read_csv_file, write_csv_file, ExportError},
    order_store::IngestSummary,
    store_actor::StoreHandle,
};

pub const DEFAULT_SNAPSHOT_PATTERN: &str = "vivid_orders_*.csv";
const SNAPSHOT_PREFIX: &str = "vivid_orders";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The outcome of reloading every snapshot in the export directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSummary {
    pub files: usize,
    pub skipped: Vec<String>,
    pub orders: IngestSummary,
}

/// A directory of CSV snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    pattern: String,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(dir: P, pattern: &str) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), pattern: pattern.to_string() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// `vivid_orders_<label>_<YYYYmmdd_HHMMSS>.csv`
    pub fn snapshot_name(label: &str, at: NaiveDateTime) -> String {
        let label = label.trim().replace(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'), "_");
        format!("{SNAPSHOT_PREFIX}_{label}_{}.csv", at.format(TIMESTAMP_FORMAT))
    }

    /// Writes the batch to a new snapshot file named for `label` and the current local time. Returns `None` without
    /// touching the disk when there is nothing to write.
    pub fn write_snapshot(&self, label: &str, records: &[OrderRecord]) -> Result<Option<PathBuf>, ExportError> {
        self.write_snapshot_at(label, records, Local::now().naive_local())
    }

    pub fn write_snapshot_at(
        &self,
        label: &str,
        records: &[OrderRecord],
        at: NaiveDateTime,
    ) -> Result<Option<PathBuf>, ExportError> {
        if records.is_empty() {
            debug!("📤️ No {label} orders to snapshot");
            return Ok(None);
        }
        fs::create_dir_all(&self.dir).map_err(|e| ExportError::write(&self.dir, e))?;
        let path = self.dir.join(Self::snapshot_name(label, at));
        let rows = write_csv_file(&path, records)?;
        info!("📤️ Saved {rows} {label} orders to {}", path.display());
        Ok(Some(path))
    }

    /// Every file in the directory matching the snapshot pattern, oldest timestamp first whatever the label. Names
    /// without a `_YYYYmmdd_HHMMSS` suffix sort before everything else, by name.
    pub fn discover(&self) -> Result<Vec<PathBuf>, ExportError> {
        let base = glob::Pattern::escape(&self.dir.to_string_lossy());
        let full = Path::new(&base).join(&self.pattern);
        let full = full.to_string_lossy();
        let mut paths = glob::glob(&full)
            .map_err(|e| ExportError::InvalidPattern { pattern: self.pattern.clone(), reason: e.to_string() })?
            .filter_map(|entry| match entry {
                Ok(path) if path.is_file() => Some(path),
                Ok(_) => None,
                Err(e) => {
                    warn!("📤️ Skipping unreadable snapshot path: {e}");
                    None
                },
            })
            .collect::<Vec<PathBuf>>();
        paths.sort_by_cached_key(|path| (snapshot_time(path), path.file_name().map(|n| n.to_os_string())));
        debug!("📤️ Found {} snapshot(s) matching {full}", paths.len());
        Ok(paths)
    }

    /// Replays every snapshot into the store, oldest first. Orders already in the store are left alone.
    pub async fn restore_into(&self, store: &StoreHandle) -> Result<RestoreSummary, ExportError> {
        let mut summary = RestoreSummary::default();
        for path in self.discover()? {
            let rows = match read_csv_file(&path) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("📤️ Ignoring snapshot. {e}");
                    summary.skipped.push(path.display().to_string());
                    continue;
                },
            };
            let result = store.load_from_csv(rows).await.map_err(|e| ExportError::read(&path, e))?;
            summary.files += 1;
            summary.orders.inserted += result.inserted;
            summary.orders.duplicates += result.duplicates;
            summary.orders.rejected += result.rejected;
            summary.orders.enriched += result.enriched;
        }
        info!(
            "📤️ Restored {} orders from {} snapshot(s). {} file(s) skipped.",
            summary.orders.inserted,
            summary.files,
            summary.skipped.len()
        );
        Ok(summary)
    }
}

/// The timestamp at the end of a snapshot file name.
fn snapshot_time(path: &Path) -> Option<NaiveDateTime> {
    let stem = path.file_stem()?.to_str()?;
    let split = stem.len().checked_sub(15)?;
    let suffix = stem.get(split..)?;
    NaiveDateTime::parse_from_str(suffix, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use vivid_tools::fields::{ORDER_ID, STATUS};

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 20).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    fn order(id: &str) -> OrderRecord {
        OrderRecord::new().with_field(ORDER_ID, id).with_field(STATUS, "COMPLETED")
    }

    #[test]
    fn names() {
        assert_eq!(
            SnapshotStore::snapshot_name("PENDING_SHIPMENT", at(9, 5, 1)),
            "vivid_orders_PENDING_SHIPMENT_20260520_090501.csv"
        );
        assert_eq!(SnapshotStore::snapshot_name("a/b c", at(0, 0, 0)), "vivid_orders_a_b_c_20260520_000000.csv");
    }

    #[test]
    fn discovery_is_ordered_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = SnapshotStore::new(dir.path(), DEFAULT_SNAPSHOT_PATTERN);
        snapshots.write_snapshot_at("COMPLETED", &[order("2")], at(12, 0, 0)).unwrap();
        snapshots.write_snapshot_at("COMPLETED", &[order("1")], at(8, 0, 0)).unwrap();
        fs::write(dir.path().join("other.csv"), "orderId\n3\n").unwrap();
        fs::create_dir(dir.path().join("vivid_orders_dir.csv")).unwrap();
        let found = snapshots.discover().unwrap();
        let names = found.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect::<Vec<_>>();
        assert_eq!(names, vec![
            "vivid_orders_COMPLETED_20260520_080000.csv",
            "vivid_orders_COMPLETED_20260520_120000.csv"
        ]);
    }

    #[test]
    fn discovery_orders_by_timestamp_not_label() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = SnapshotStore::new(dir.path(), DEFAULT_SNAPSHOT_PATTERN);
        let old = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let new = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        snapshots.write_snapshot_at("PENDING_SHIPMENT", &[order("1")], old).unwrap();
        snapshots.write_snapshot_at("COMPLETED", &[order("1")], new).unwrap();
        fs::write(dir.path().join("vivid_orders_manual.csv"), "orderId\n2\n").unwrap();
        let found = snapshots.discover().unwrap();
        let names = found.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect::<Vec<_>>();
        assert_eq!(names, vec![
            "vivid_orders_manual.csv",
            "vivid_orders_PENDING_SHIPMENT_20200101_000000.csv",
            "vivid_orders_COMPLETED_20260101_000000.csv"
        ]);
    }

    #[test]
    fn empty_batches_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = SnapshotStore::new(dir.path().join("nested"), DEFAULT_SNAPSHOT_PATTERN);
        assert_eq!(snapshots.write_snapshot("COMPLETED", &[]).unwrap(), None);
        assert!(!dir.path().join("nested").exists());
        assert!(snapshots.discover().unwrap().is_empty());
    }

    #[test]
    fn bad_patterns_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = SnapshotStore::new(dir.path(), "vivid_[orders.csv");
        assert!(matches!(snapshots.discover(), Err(ExportError::InvalidPattern { .. })));
    }
}
