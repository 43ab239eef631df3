use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use crate::services::PREDICTION_HORIZONS;

/// Growth tracker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthConfig {
    pub members_collection: String,
    pub default_horizon_months: u32,
    pub backup_dir: PathBuf,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            members_collection: "members".to_string(),
            default_horizon_months: PREDICTION_HORIZONS[0],
            backup_dir: PathBuf::from("."),
        }
    }
}

impl GrowthConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let members_collection = lookup("GROWTH_MEMBERS_COLLECTION")
            .unwrap_or(defaults.members_collection);
        if members_collection.trim().is_empty() {
            bail!("GROWTH_MEMBERS_COLLECTION must not be empty");
        }

        let default_horizon_months = match lookup("GROWTH_DEFAULT_HORIZON_MONTHS") {
            Some(value) => value
                .parse()
                .with_context(|| format!("GROWTH_DEFAULT_HORIZON_MONTHS is not a month count: {}", value))?,
            None => defaults.default_horizon_months,
        };

        let backup_dir = lookup("GROWTH_BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.backup_dir);

        Ok(Self {
            members_collection,
            default_horizon_months,
            backup_dir,
        })
    }
}
