use std::fmt;
use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use config::{Config, Environment, File};
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;

use crate::digest::parse_hyperion_id;

/// Default configuration file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "hyperion.toml";

/// Devnet configuration
#[derive(Clone, Deserialize)]
pub struct DevnetConfig {
    /// 32-byte hex or a short ASCII name
    pub hyperion_id: String,
    pub power_threshold: u64,
    #[serde(default = "default_block_time")]
    pub block_time_secs: u64,
    /// Cosmos account that instantiates and owns the bridge
    pub deployer: String,
    /// Cosmos account that submits batches and rotations
    pub relayer: String,
    pub validators: Vec<ValidatorConfig>,
}

#[derive(Clone, Deserialize)]
pub struct ValidatorConfig {
    pub private_key: String,
    pub power: u64,
}

/// Custom Debug that redacts private keys to prevent accidental log leakage.
impl fmt::Debug for DevnetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevnetConfig")
            .field("hyperion_id", &self.hyperion_id)
            .field("power_threshold", &self.power_threshold)
            .field("block_time_secs", &self.block_time_secs)
            .field("deployer", &self.deployer)
            .field("relayer", &self.relayer)
            .field("validators", &self.validators)
            .finish()
    }
}

/// Custom Debug that redacts the validator key.
impl fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("private_key", &"<redacted>")
            .field("power", &self.power)
            .finish()
    }
}

fn default_block_time() -> u64 {
    6
}

impl DevnetConfig {
    /// Load configuration from `path` (or `hyperion.toml`), then apply
    /// `HYPERION__*` environment overrides. A `.env` file is loaded first
    /// if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if Path::new(".env").exists() {
            dotenvy::dotenv().wrap_err("Failed to load .env file")?;
        }

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: DevnetConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("HYPERION")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .wrap_err("Failed to read configuration")?
            .try_deserialize()
            .wrap_err("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the keys parse and the threshold is reachable.
    pub fn validate(&self) -> Result<()> {
        parse_hyperion_id(&self.hyperion_id)?;
        if self.deployer.trim().is_empty() || self.relayer.trim().is_empty() {
            return Err(eyre!("deployer and relayer accounts are required"));
        }

        if self.validators.is_empty() {
            return Err(eyre!("At least one validator is required"));
        }
        for (i, validator) in self.validators.iter().enumerate() {
            parse_key(&validator.private_key).wrap_err_with(|| format!("validators[{i}]"))?;
        }

        let total: u128 = self.validators.iter().map(|v| u128::from(v.power)).sum();
        if total < u128::from(self.power_threshold) {
            return Err(eyre!(
                "Validator power {} does not reach the threshold {}",
                total,
                self.power_threshold
            ));
        }
        Ok(())
    }

    pub fn hyperion_id(&self) -> Result<[u8; 32]> {
        parse_hyperion_id(&self.hyperion_id)
    }

    pub fn validator_keys(&self) -> Result<Vec<PrivateKeySigner>> {
        self.validators
            .iter()
            .map(|v| parse_key(&v.private_key))
            .collect()
    }
}

/// Parse a hex private key, with or without `0x`.
pub fn parse_key(key: &str) -> Result<PrivateKeySigner> {
    key.trim()
        .parse::<PrivateKeySigner>()
        .map_err(|e| eyre!("Invalid private key: {}", e))
}
