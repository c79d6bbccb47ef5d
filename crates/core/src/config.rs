//! Configuration management for Keyward.
//!
//! Configuration is read once at crypto-subsystem startup. Every section has
//! defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cache: CacheConfig,
    pub kex: KexConfig,
    pub hardware: HardwareConfig,
}

/// Fingerprint cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// When false, fingerprints are recomputed on every request.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Key-exchange provider selection, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KexConfig {
    pub providers: Vec<ProviderKind>,
}

impl Default for KexConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderKind::Software],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Software,
    Hardware,
}

/// Hardware key manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HardwareConfig {
    pub enabled: bool,
    /// Path of the key manager control socket or device node.
    pub device: PathBuf,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            device: PathBuf::from("/run/keyward/tkm.sock"),
        }
    }
}

impl Config {
    /// Load and validate a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-section consistency.
    pub fn validate(&self) -> Result<()> {
        if self.kex.providers.is_empty() {
            return Err(CoreError::Config(
                "kex.providers must name at least one provider".to_string(),
            ));
        }

        for (i, provider) in self.kex.providers.iter().enumerate() {
            if self.kex.providers[..i].contains(provider) {
                return Err(CoreError::Config(format!(
                    "kex provider {:?} listed more than once",
                    provider
                )));
            }
        }

        if self.kex.providers.contains(&ProviderKind::Hardware) && !self.hardware.enabled {
            return Err(CoreError::Config(
                "kex provider \"hardware\" requires hardware.enabled = true".to_string(),
            ));
        }

        Ok(())
    }
}
