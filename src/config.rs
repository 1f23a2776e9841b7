//! Run configuration: the market and order parameters a request is built with.

use crate::error::ConfigError;
use crate::request::{MarketParams, OrderParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every field is optional in the file and falls back to the engine defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub market: MarketParams,
    pub order: OrderParams,
}

impl RunConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.market.validate()?;
        config.order.validate()?;
        Ok(config)
    }
}
