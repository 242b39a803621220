use std::env;

use log::*;
use order_porter_engine::PorterConfig;
use porter_common::env_or_default;

const DEFAULT_PORTER_HOST: &str = "127.0.0.1";
const DEFAULT_PORTER_PORT: u16 = 8480;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Everything the engine needs: vendor credentials, export directory, warehouse.
    pub porter: PorterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: DEFAULT_PORTER_HOST.to_string(), port: DEFAULT_PORTER_PORT, porter: PorterConfig::default() }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PORTER_HOST").ok().unwrap_or_else(|| DEFAULT_PORTER_HOST.into());
        let port = env_or_default("PORTER_PORT", DEFAULT_PORTER_PORT);
        let porter = PorterConfig::new_from_env_or_default();
        if !porter.vivid.has_token() {
            warn!("🪛️ VIVID_API_TOKEN is not set. The dashboard will serve saved snapshots only.");
        }
        Self { host, port, porter }
    }
}
