//! Ordered provider list consulted for each new exchange.

use keyward_core::{KexConfig, ProviderKind};
use tracing::{debug, info};

use crate::contract::{DiffieHellman, KexError, KexProvider, KexResult};
use crate::group::DhGroup;
use crate::software::SoftwareKexProvider;

/// Providers in priority order. The first one offering a group wins.
#[derive(Default)]
pub struct KexRegistry {
    providers: Vec<Box<dyn KexProvider>>,
}

impl KexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry in the order given by `[kex] providers`.
    ///
    /// A hardware provider must be supplied when the configuration lists it;
    /// one supplied but not listed is dropped.
    pub fn from_config(
        config: &KexConfig,
        mut hardware: Option<Box<dyn KexProvider>>,
    ) -> KexResult<Self> {
        let mut registry = Self::new();
        for kind in &config.providers {
            match kind {
                ProviderKind::Software => registry.register(Box::new(SoftwareKexProvider::new())),
                ProviderKind::Hardware => {
                    let provider = hardware
                        .take()
                        .ok_or_else(|| KexError::ProviderUnavailable("hardware".to_string()))?;
                    registry.register(provider);
                }
            }
        }
        if hardware.is_some() {
            info!("hardware key exchange provider not enabled in configuration");
        }
        info!(providers = ?registry.names(), "key exchange registry ready");
        Ok(registry)
    }

    pub fn register(&mut self, provider: Box<dyn KexProvider>) {
        self.providers.push(provider);
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn create(&self, group: DhGroup) -> Option<Box<dyn DiffieHellman>> {
        for provider in &self.providers {
            if let Some(dh) = provider.create(group) {
                debug!(provider = provider.name(), %group, "created key exchange");
                return Some(dh);
            }
        }
        debug!(%group, "no provider offers group");
        None
    }
}
