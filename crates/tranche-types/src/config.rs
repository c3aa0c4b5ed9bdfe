//! Configuration for the main instrument and its deployment tranches.

use serde::{Deserialize, Serialize};

use crate::{DeploymentId, Result, TrancheError, constants, deployment_label};

/// Metadata for the main ledger and the naming template for its tranches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Main instrument name.
    pub name: String,
    /// Main instrument symbol.
    pub symbol: String,
    /// Decimal precision shared by the main and deployment instruments.
    pub decimals: u8,
    /// Prefix of every deployment instrument's name.
    pub deployment_name_prefix: String,
    /// Prefix of every deployment instrument's symbol.
    pub deployment_symbol_prefix: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: constants::DEFAULT_NAME.to_string(),
            symbol: constants::DEFAULT_SYMBOL.to_string(),
            decimals: constants::DEFAULT_DECIMALS,
            deployment_name_prefix: constants::DEFAULT_DEPLOYMENT_NAME_PREFIX.to_string(),
            deployment_symbol_prefix: constants::DEFAULT_DEPLOYMENT_SYMBOL_PREFIX.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TrancheError::Configuration("name is empty".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(TrancheError::Configuration("symbol is empty".into()));
        }
        if self.deployment_symbol_prefix.trim().is_empty() {
            return Err(TrancheError::Configuration(
                "deployment_symbol_prefix is empty".into(),
            ));
        }
        if self.decimals > constants::MAX_DECIMALS {
            return Err(TrancheError::Configuration(format!(
                "decimals {} exceeds {}",
                self.decimals,
                constants::MAX_DECIMALS
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn deployment_name(&self, id: DeploymentId) -> String {
        deployment_label(&self.deployment_name_prefix, id)
    }

    #[must_use]
    pub fn deployment_symbol(&self, id: DeploymentId) -> String {
        deployment_label(&self.deployment_symbol_prefix, id)
    }
}
