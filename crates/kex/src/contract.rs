//! Key-exchange plugin contract.
//!
//! The protocol engine only sees [`KexProvider`] and [`DiffieHellman`]; each
//! backend (software, hardware key manager) implements both. One handle is
//! created per negotiation and dropping it releases backend resources.

use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::group::DhGroup;

/// Key exchange errors.
///
/// Backend failures carry no detail across the contract; providers log the
/// cause before returning [`KexError::Backend`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KexError {
    #[error("Invalid public value for {group}: {reason}")]
    InvalidPublicValue { group: DhGroup, reason: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Key exchange backend failure")]
    Backend,

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Result type for key exchange operations.
pub type KexResult<T> = Result<T, KexError>;

/// Negotiated Diffie-Hellman secret. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret([REDACTED; {}])", self.0.len())
    }
}

/// One Diffie-Hellman exchange in one negotiation.
pub trait DiffieHellman: Send {
    /// Group this exchange runs in.
    fn group(&self) -> DhGroup;

    /// Our public value, in the group's IKE wire format.
    fn public_value(&self) -> KexResult<Vec<u8>>;

    /// Accept the peer's public value and derive the shared secret.
    fn set_peer_public_value(&mut self, value: &[u8]) -> KexResult<()>;

    /// The derived secret. May block on backend I/O.
    fn shared_secret(&self) -> KexResult<SharedSecret>;
}

/// Factory for exchanges of one backend.
pub trait KexProvider: Send + Sync {
    fn name(&self) -> &str;

    /// New exchange for `group`, or `None` if this backend does not offer it.
    fn create(&self, group: DhGroup) -> Option<Box<dyn DiffieHellman>>;
}
