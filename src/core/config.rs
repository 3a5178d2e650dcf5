use std::path::Path;
use std::time::Duration;
use serde::Deserialize;
use crate::collection::retry::RetryPolicy;
use crate::core::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics_collection: String,
    pub bioentities_collection: String,

    // Bulk indexing
    pub batch_size: usize,                      // Documents per flush
    pub commit_size: u64,                       // Intermediate commit threshold

    // Write path
    pub max_retries: u32,                       // Transient add retries before rollback
    pub retry_base_delay_ms: u64,               // Linear backoff base

    // Read path
    pub default_rows: usize,                    // Row cap when a plan never sets one
    pub default_facet_limit: usize,             // Terms facet bucket limit when unset
}

impl Default for Config {
    fn default() -> Self {
        Config {
            analytics_collection: "analytics".to_string(),
            bioentities_collection: "bioentities".to_string(),

            batch_size: 500,
            commit_size: 5_000_000,                     // Committing more often slows the engine down

            max_retries: 10,
            retry_base_delay_ms: 1_000,

            default_rows: 100_000,
            default_facet_limit: 1_000,
        }
    }
}

impl Config {
    /// Parse an operator override; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}
