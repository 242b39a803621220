use std::{env, time::Duration};

use log::*;
use porter_common::{env_or_default, Secret};

pub const DEFAULT_API_URL: &str = "https://brokers.vividseats.com/webservices/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TRANSFER_SOURCE: &str = "TICKETMASTER";

#[derive(Debug, Clone)]
pub struct VividConfig {
    /// Base URL of the broker web services. Endpoint paths are appended to it.
    pub api_url: String,
    pub api_token: Secret<String>,
    /// Applied to every request. Requests are never retried.
    pub timeout: Duration,
    /// The `transferSource` value sent with URL transfers when the caller does not supply one.
    pub transfer_source: String,
}

impl Default for VividConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            transfer_source: DEFAULT_TRANSFER_SOURCE.to_string(),
        }
    }
}

impl VividConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = env::var("VIVID_API_URL").unwrap_or_else(|_| {
            debug!("🎫️ VIVID_API_URL not set, using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        let api_token = Secret::new(env::var("VIVID_API_TOKEN").unwrap_or_else(|_| {
            warn!("🎫️ VIVID_API_TOKEN not set. Orders cannot be fetched until a token is supplied.");
            String::default()
        }));
        let timeout = Duration::from_secs(env_or_default("VIVID_API_TIMEOUT", DEFAULT_TIMEOUT_SECS));
        let transfer_source = env::var("VIVID_TRANSFER_SOURCE").unwrap_or_else(|_| DEFAULT_TRANSFER_SOURCE.to_string());
        Self { api_url: api_url.trim_end_matches('/').to_string(), api_token, timeout, transfer_source }
    }

    /// Replaces the configured token, e.g. with one typed in by the operator.
    pub fn with_token(mut self, token: &str) -> Self {
        self.api_token = Secret::new(token.trim().to_string());
        self
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn has_token(&self) -> bool {
        !self.api_token.is_blank()
    }
}
