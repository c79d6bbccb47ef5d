//! Elliptic-curve public keys (ECDSA) and their builder.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::builder::{Builder, BuilderPart, ConstructionState};
use crate::cache::{FingerprintCache, KeyIdentity};
use crate::codec::{decode_ec_spki, encode_ec_spki, CodecResult, EcCurve, EcKeyMaterial, HashAlgorithm};
use crate::public_key::{KeyHandle, PublicKey};
use crate::scheme::{KeyEncoding, KeyType, SignatureScheme};
use crate::verifier::verify_signature;

/// ECDSA public key on a named curve.
pub struct EcPublicKey {
    material: EcKeyMaterial,
    identity: KeyIdentity,
    cache: Arc<FingerprintCache>,
}

impl EcPublicKey {
    /// Load a key from a DER SubjectPublicKeyInfo blob.
    pub fn load(blob: &[u8], cache: Arc<FingerprintCache>) -> CodecResult<Self> {
        let material = decode_ec_spki(blob)?;
        Ok(Self::from_material(material, cache))
    }

    pub fn from_material(material: EcKeyMaterial, cache: Arc<FingerprintCache>) -> Self {
        let identity = cache.allocate_identity();
        trace!(%identity, curve = %material.curve(), "created EC public key");
        Self {
            material,
            identity,
            cache,
        }
    }

    pub fn curve(&self) -> EcCurve {
        self.material.curve()
    }

    pub fn identity(&self) -> KeyIdentity {
        self.identity
    }
}

/// Fingerprint of EC key material, memoised in `cache` under `identity`.
///
/// Shared by every EC key object so that a private key and its public half
/// produce the same identifiers.
pub fn ec_fingerprint(
    material: &EcKeyMaterial,
    identity: KeyIdentity,
    cache: &FingerprintCache,
    encoding: KeyEncoding,
) -> Option<Vec<u8>> {
    if !matches!(encoding, KeyEncoding::PubkeySha1 | KeyEncoding::PubkeyInfoSha1) {
        return None;
    }

    cache.get_or_compute(identity, encoding, || {
        let encoded = match encoding {
            KeyEncoding::PubkeySha1 => material.to_sec1(),
            _ => encode_ec_spki(material)
                .map_err(|e| debug!(error = %e, "EC SubjectPublicKeyInfo encoding failed"))
                .ok()?,
        };
        Some(HashAlgorithm::Sha1.digest(&encoded))
    })
}

impl PublicKey for EcPublicKey {
    fn key_type(&self) -> KeyType {
        KeyType::Ecdsa
    }

    fn verify(&self, scheme: SignatureScheme, data: &[u8], signature: &[u8]) -> bool {
        verify_signature(&self.material, scheme, data, signature)
    }

    fn encrypt(&self, _plain: &[u8]) -> Option<Vec<u8>> {
        warn!("EC public key encryption not implemented");
        None
    }

    fn keysize(&self) -> usize {
        self.curve().field_len()
    }

    fn fingerprint(&self, encoding: KeyEncoding) -> Option<Vec<u8>> {
        ec_fingerprint(&self.material, self.identity, &self.cache, encoding)
    }

    fn encoding(&self, encoding: KeyEncoding) -> Option<Vec<u8>> {
        match encoding {
            KeyEncoding::PubSpkiAsn1Der => encode_ec_spki(&self.material)
                .map_err(|e| debug!(error = %e, "EC SubjectPublicKeyInfo encoding failed"))
                .ok(),
            _ => None,
        }
    }
}

impl Drop for EcPublicKey {
    fn drop(&mut self) {
        self.cache.clear(self.identity);
        trace!(identity = %self.identity, "destroyed EC public key");
    }
}

impl fmt::Debug for EcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPublicKey")
            .field("curve", &self.curve())
            .field("identity", &self.identity)
            .finish()
    }
}

/// Builder loading an [`EcPublicKey`] from a DER SubjectPublicKeyInfo blob.
pub struct EcPublicKeyBuilder {
    cache: Arc<FingerprintCache>,
    state: ConstructionState<KeyHandle>,
}

impl EcPublicKeyBuilder {
    /// Builder for `key_type`, or `None` if this backend does not load it.
    pub fn for_type(key_type: KeyType, cache: Arc<FingerprintCache>) -> Option<Self> {
        match key_type {
            KeyType::Ecdsa | KeyType::Any => Some(Self {
                cache,
                state: ConstructionState::default(),
            }),
            _ => None,
        }
    }
}

impl Builder for EcPublicKeyBuilder {
    type Output = KeyHandle;

    fn add(&mut self, part: BuilderPart) {
        match part {
            BuilderPart::BlobAsn1Der(blob) if self.state.is_accumulating() => {
                let cache = Arc::clone(&self.cache);
                self.state.attempt(|| match EcPublicKey::load(&blob, cache) {
                    Ok(key) => Some(KeyHandle::new(key)),
                    Err(e) => {
                        debug!(error = %e, "failed to load EC public key");
                        None
                    }
                });
            }
            part => {
                debug!(part = part.kind(), "cancelling EC public key builder");
                self.state.cancel();
            }
        }
    }

    fn build(self: Box<Self>) -> Option<KeyHandle> {
        self.state.into_output()
    }
}
