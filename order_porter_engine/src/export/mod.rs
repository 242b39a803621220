//! # Exports
//!
//! CSV is the only on-disk format. [`csv_io`] turns a batch of records into a table whose header is the sorted union
//! of every field name in the batch, and reads such a table back. [`snapshots`] names, writes and rediscovers the
//! per-fetch snapshot files that let a new session pick up where the last one left off.
mod csv_io;
mod errors;
mod snapshots;

pub use csv_io::{csv_header, read_csv, read_csv_file, write_csv, write_csv_file};
pub use errors::ExportError;
pub use snapshots::{RestoreSummary, SnapshotStore, DEFAULT_SNAPSHOT_PATTERN};
