//! Runtime configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "api_key": "...", "poll_interval_ms": 2000 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Ton20Error, Ton20Result};
use crate::indexer::DEFAULT_INDEXER_URL;
use crate::submitter::SubmitOptions;
use crate::toncenter::DEFAULT_TONCENTER_URL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ton20Config {
    /// toncenter v2 API base URL.
    pub toncenter_url: String,
    /// toncenter API key, sent as `X-API-Key`.
    pub api_key: Option<String>,
    /// TON20 indexer GraphQL endpoint.
    pub indexer_url: String,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub message_ttl_secs: u64,
    pub workchain: i32,
}

impl Default for Ton20Config {
    fn default() -> Self {
        Ton20Config {
            toncenter_url: DEFAULT_TONCENTER_URL.to_string(),
            api_key: None,
            indexer_url: DEFAULT_INDEXER_URL.to_string(),
            request_timeout_secs: 30,
            poll_interval_ms: 1000,
            max_polls: 1000,
            message_ttl_secs: 60,
            workchain: 0,
        }
    }
}

impl Ton20Config {
    /// Load a JSON config file.
    pub fn from_file(path: &Path) -> Ton20Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Ton20Error::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
            .map_err(|e| Ton20Error::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Submission timing; `await_last` stays off.
    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_polls: self.max_polls,
            message_ttl: Duration::from_secs(self.message_ttl_secs),
            await_last: false,
        }
    }
}
