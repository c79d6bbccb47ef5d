//! Key exchange delegated to an external key manager.
//!
//! Private values never leave the key manager. Every exchange is bound to a
//! [`ContextId`] allocated by the provider; dropping the exchange resets that
//! context on the key manager.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use keyward_core::HardwareConfig;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::contract::{DiffieHellman, KexError, KexProvider, KexResult, SharedSecret};
use crate::group::DhGroup;

/// Key manager DH context slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dh-ctx#{}", self.0)
    }
}

/// Errors reported by a key manager session.
#[derive(Debug, Error)]
pub enum KeyManagerError {
    #[error("Key manager unavailable: {0}")]
    Unavailable(String),

    #[error("Key manager rejected request: {0}")]
    Rejected(String),
}

/// Session with a key manager holding DH private values.
pub trait KeyManagerSession: Send + Sync {
    fn supports(&self, group: DhGroup) -> bool;

    /// Allocate `context` and generate a private value in `group`.
    fn dh_create(&self, context: ContextId, group: DhGroup) -> Result<(), KeyManagerError>;

    fn dh_public_value(&self, context: ContextId) -> Result<Vec<u8>, KeyManagerError>;

    /// Derive the shared secret from the peer's public value.
    fn dh_generate_key(&self, context: ContextId, peer: &[u8]) -> Result<(), KeyManagerError>;

    fn dh_shared_secret(&self, context: ContextId) -> Result<Vec<u8>, KeyManagerError>;

    /// Release `context`.
    fn dh_reset(&self, context: ContextId) -> Result<(), KeyManagerError>;
}

/// Provider delegating to a [`KeyManagerSession`].
pub struct HardwareKexProvider<S> {
    session: Arc<S>,
    next_context: AtomicU64,
}

impl<S: KeyManagerSession + 'static> HardwareKexProvider<S> {
    pub fn new(session: Arc<S>) -> Self {
        info!("STATUS: HardwareKexProvider :: key manager session attached");
        Self::with_session(session)
    }

    /// Attach `session`, opened on `config.device`, if hardware is enabled.
    pub fn from_config(session: Arc<S>, config: &HardwareConfig) -> KexResult<Self> {
        if !config.enabled {
            warn!(
                device = %config.device.display(),
                "STATUS: HardwareKexProvider :: DISABLED"
            );
            return Err(KexError::ProviderUnavailable("hardware disabled".to_string()));
        }
        info!(
            device = %config.device.display(),
            "STATUS: HardwareKexProvider :: key manager session attached"
        );
        Ok(Self::with_session(session))
    }

    fn with_session(session: Arc<S>) -> Self {
        Self {
            session,
            next_context: AtomicU64::new(1),
        }
    }
}

impl<S> fmt::Debug for HardwareKexProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardwareKexProvider")
            .field("next_context", &self.next_context.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<S: KeyManagerSession + 'static> KexProvider for HardwareKexProvider<S> {
    fn name(&self) -> &str {
        "hardware"
    }

    fn create(&self, group: DhGroup) -> Option<Box<dyn DiffieHellman>> {
        if !self.session.supports(group) {
            return None;
        }
        let context = ContextId(self.next_context.fetch_add(1, Ordering::Relaxed));
        if let Err(e) = self.session.dh_create(context, group) {
            warn!(%context, %group, error = %e, "key manager failed to create DH context");
            return None;
        }
        debug!(%context, %group, "created key manager DH context");
        Some(Box::new(HardwareDiffieHellman {
            session: Arc::clone(&self.session),
            context,
            group,
        }))
    }
}

struct HardwareDiffieHellman<S: KeyManagerSession> {
    session: Arc<S>,
    context: ContextId,
    group: DhGroup,
}

impl<S: KeyManagerSession> HardwareDiffieHellman<S> {
    fn backend_failure(&self, operation: &'static str) -> impl Fn(KeyManagerError) -> KexError {
        let context = self.context;
        move |e| {
            warn!(%context, operation, error = %e, "key manager operation failed");
            KexError::Backend
        }
    }
}

impl<S: KeyManagerSession> DiffieHellman for HardwareDiffieHellman<S> {
    fn group(&self) -> DhGroup {
        self.group
    }

    fn public_value(&self) -> KexResult<Vec<u8>> {
        self.session
            .dh_public_value(self.context)
            .map_err(self.backend_failure("public_value"))
    }

    fn set_peer_public_value(&mut self, value: &[u8]) -> KexResult<()> {
        self.session
            .dh_generate_key(self.context, value)
            .map_err(self.backend_failure("generate_key"))
    }

    fn shared_secret(&self) -> KexResult<SharedSecret> {
        self.session
            .dh_shared_secret(self.context)
            .map(SharedSecret::new)
            .map_err(self.backend_failure("shared_secret"))
    }
}

impl<S: KeyManagerSession> Drop for HardwareDiffieHellman<S> {
    fn drop(&mut self) {
        match self.session.dh_reset(self.context) {
            Ok(()) => trace!(context = %self.context, "reset key manager DH context"),
            Err(e) => warn!(context = %self.context, error = %e, "failed to reset DH context"),
        }
    }
}
