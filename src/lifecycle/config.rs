//! Adapter configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Channel sizes and platform paths used when wiring the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Capacity of the client → adapter request channel.
    pub request_buffer: usize,
    /// Capacity of the store → adapter notification channel.
    pub event_buffer: usize,
    /// Outcomes retained for slow transaction feed subscribers.
    pub feed_capacity: usize,
    /// Location of the locally cached receipt.
    pub receipt_path: PathBuf,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            request_buffer: 32,
            event_buffer: 64,
            feed_capacity: 16,
            receipt_path: PathBuf::from("StoreKit").join("sandboxReceipt"),
        }
    }
}

impl AdapterConfig {
    pub const ENV_PREFIX: &'static str = "PURCHASE_ADAPTER_";

    /// Defaults overridden by `PURCHASE_ADAPTER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `PURCHASE_ADAPTER_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |name: &str| lookup(&format!("{}{}", Self::ENV_PREFIX, name));

        if let Some(value) = var("REQUEST_BUFFER") {
            config.request_buffer = parse_size("REQUEST_BUFFER", value)?;
        }
        if let Some(value) = var("EVENT_BUFFER") {
            config.event_buffer = parse_size("EVENT_BUFFER", value)?;
        }
        if let Some(value) = var("FEED_CAPACITY") {
            config.feed_capacity = parse_size("FEED_CAPACITY", value)?;
        }
        if let Some(value) = var("RECEIPT_PATH") {
            config.receipt_path = PathBuf::from(value);
        }

        config.validate()?;
        Ok(config)
    }

    /// Channel capacities must be non-zero; tokio panics otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_buffer == 0 {
            return Err(ConfigError::Zero("request_buffer"));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::Zero("event_buffer"));
        }
        if self.feed_capacity == 0 {
            return Err(ConfigError::Zero("feed_capacity"));
        }
        Ok(())
    }
}

fn parse_size(key: &'static str, value: String) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
