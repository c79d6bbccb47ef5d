//! In-process key exchange backed by RustCrypto/dalek primitives.
//!
//! Curve25519 public values are the raw 32-byte u-coordinate. ECP-256 public
//! values are x ‖ y (64 bytes) without the SEC1 0x04 tag, as IKEv2 sends them.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use tracing::debug;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey};

use crate::contract::{DiffieHellman, KexError, KexProvider, KexResult, SharedSecret};
use crate::group::DhGroup;

/// Software provider for Curve25519 and ECP-256.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareKexProvider;

impl SoftwareKexProvider {
    pub fn new() -> Self {
        Self
    }
}

impl KexProvider for SoftwareKexProvider {
    fn name(&self) -> &str {
        "software"
    }

    fn create(&self, group: DhGroup) -> Option<Box<dyn DiffieHellman>> {
        match group {
            DhGroup::Curve25519 => Some(Box::new(X25519Exchange::new())),
            DhGroup::Ecp256 => Some(Box::new(Ecp256Exchange::new())),
            _ => None,
        }
    }
}

fn invalid(group: DhGroup, reason: impl Into<String>) -> KexError {
    let reason = reason.into();
    debug!(%group, %reason, "rejecting peer public value");
    KexError::InvalidPublicValue { group, reason }
}

fn missing_peer() -> KexError {
    KexError::InvalidState("peer public value not set".to_string())
}

fn peer_already_set() -> KexError {
    KexError::InvalidState("peer public value already set".to_string())
}

struct X25519Exchange {
    secret: Option<EphemeralSecret>,
    public: X25519PublicKey,
    shared: Option<SharedSecret>,
}

impl X25519Exchange {
    fn new() -> Self {
        let secret = EphemeralSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self {
            secret: Some(secret),
            public,
            shared: None,
        }
    }
}

impl DiffieHellman for X25519Exchange {
    fn group(&self) -> DhGroup {
        DhGroup::Curve25519
    }

    fn public_value(&self) -> KexResult<Vec<u8>> {
        Ok(self.public.as_bytes().to_vec())
    }

    fn set_peer_public_value(&mut self, value: &[u8]) -> KexResult<()> {
        let bytes: [u8; 32] = value.try_into().map_err(|_| {
            invalid(
                DhGroup::Curve25519,
                format!("expected 32 bytes, got {}", value.len()),
            )
        })?;
        // The ephemeral secret is consumed by the exchange.
        let secret = self.secret.take().ok_or_else(peer_already_set)?;
        let shared = secret.diffie_hellman(&X25519PublicKey::from(bytes));
        if !shared.was_contributory() {
            return Err(invalid(DhGroup::Curve25519, "low-order point"));
        }
        self.shared = Some(SharedSecret::new(shared.as_bytes().to_vec()));
        Ok(())
    }

    fn shared_secret(&self) -> KexResult<SharedSecret> {
        self.shared.clone().ok_or_else(missing_peer)
    }
}

struct Ecp256Exchange {
    secret: p256::ecdh::EphemeralSecret,
    shared: Option<SharedSecret>,
}

impl Ecp256Exchange {
    fn new() -> Self {
        Self {
            secret: p256::ecdh::EphemeralSecret::random(&mut OsRng),
            shared: None,
        }
    }
}

impl DiffieHellman for Ecp256Exchange {
    fn group(&self) -> DhGroup {
        DhGroup::Ecp256
    }

    fn public_value(&self) -> KexResult<Vec<u8>> {
        let point = self.secret.public_key().to_encoded_point(false);
        Ok(point.as_bytes()[1..].to_vec())
    }

    fn set_peer_public_value(&mut self, value: &[u8]) -> KexResult<()> {
        if self.shared.is_some() {
            return Err(peer_already_set());
        }
        if value.len() != 64 {
            return Err(invalid(
                DhGroup::Ecp256,
                format!("expected 64 bytes, got {}", value.len()),
            ));
        }
        let mut sec1 = Vec::with_capacity(65);
        sec1.push(0x04);
        sec1.extend_from_slice(value);
        let peer = p256::PublicKey::from_sec1_bytes(&sec1)
            .map_err(|_| invalid(DhGroup::Ecp256, "point not on curve"))?;
        let shared = self.secret.diffie_hellman(&peer);
        self.shared = Some(SharedSecret::new(shared.raw_secret_bytes().to_vec()));
        Ok(())
    }

    fn shared_secret(&self) -> KexResult<SharedSecret> {
        self.shared.clone().ok_or_else(missing_peer)
    }
}
