use std::{env, path::PathBuf};

use log::*;
use porter_common::{env_flag, env_or_default};
use vivid_tools::VividConfig;

use crate::{
    export::DEFAULT_SNAPSHOT_PATTERN,
    order_store::DEFAULT_ENRICHMENT_THRESHOLD,
    warehouse::{WarehouseConfig, DEFAULT_WAREHOUSE_TABLE},
};

#[derive(Debug, Clone)]
pub struct PorterConfig {
    pub vivid: VividConfig,
    /// Where snapshots are written and looked for.
    pub export_dir: PathBuf,
    pub snapshot_pattern: String,
    /// Reloaded CSV rows with more populated fields than this are treated as enriched.
    pub enrichment_threshold: usize,
    /// Reload every snapshot in `export_dir` on startup.
    pub load_snapshots: bool,
    /// `None` disables the warehouse push.
    pub warehouse: Option<WarehouseConfig>,
}

impl Default for PorterConfig {
    fn default() -> Self {
        Self {
            vivid: VividConfig::default(),
            export_dir: PathBuf::from("."),
            snapshot_pattern: DEFAULT_SNAPSHOT_PATTERN.to_string(),
            enrichment_threshold: DEFAULT_ENRICHMENT_THRESHOLD,
            load_snapshots: true,
            warehouse: None,
        }
    }
}

impl PorterConfig {
    pub fn new_from_env_or_default() -> Self {
        let vivid = VividConfig::new_from_env_or_default();
        let export_dir = env::var("PORTER_EXPORT_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            debug!("📤️ PORTER_EXPORT_DIR is not set. Snapshots go to the working directory.");
            PathBuf::from(".")
        });
        let snapshot_pattern =
            env::var("PORTER_SNAPSHOT_PATTERN").unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATTERN.to_string());
        let enrichment_threshold = env_or_default("PORTER_ENRICHMENT_THRESHOLD", DEFAULT_ENRICHMENT_THRESHOLD);
        let load_snapshots = env_flag("PORTER_LOAD_SNAPSHOTS", true);
        let warehouse = match env::var("PORTER_WAREHOUSE_URL") {
            Ok(url) if !url.trim().is_empty() => {
                let table =
                    env::var("PORTER_WAREHOUSE_TABLE").unwrap_or_else(|_| DEFAULT_WAREHOUSE_TABLE.to_string());
                Some(WarehouseConfig::new(url.trim(), table.trim()))
            },
            _ => {
                info!("🗃️ PORTER_WAREHOUSE_URL is not set. Warehouse pushes are disabled.");
                None
            },
        };
        Self { vivid, export_dir, snapshot_pattern, enrichment_threshold, load_snapshots, warehouse }
    }
}
