//! Public key capability set and its shared handle.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::trace;

use crate::scheme::{KeyEncoding, KeyType, SignatureScheme};

/// Capabilities every public key backend offers.
///
/// All methods are read-only with respect to key material and report failure
/// through their return value; none of them panic on hostile input.
pub trait PublicKey: Send + Sync + fmt::Debug {
    /// Algorithm family of this key.
    fn key_type(&self) -> KeyType;

    /// Check `signature` over `data` under `scheme`.
    ///
    /// Returns `false` for unsupported schemes, malformed signatures and
    /// mismatches alike.
    fn verify(&self, scheme: SignatureScheme, data: &[u8], signature: &[u8]) -> bool;

    /// Encrypt `plain` to this key, if the algorithm supports it.
    fn encrypt(&self, plain: &[u8]) -> Option<Vec<u8>>;

    /// Key size in bytes.
    fn keysize(&self) -> usize;

    /// Identity fingerprint of the requested form.
    fn fingerprint(&self, encoding: KeyEncoding) -> Option<Vec<u8>>;

    /// Full encoding of the requested form.
    fn encoding(&self, encoding: KeyEncoding) -> Option<Vec<u8>>;

    /// Whether `other` is the same key, judged by the first fingerprint form
    /// both keys can produce.
    fn equals(&self, other: &dyn PublicKey) -> bool {
        if self.key_type() != other.key_type() {
            return false;
        }
        for encoding in KeyEncoding::FINGERPRINTS {
            if let (Some(a), Some(b)) = (self.fingerprint(encoding), other.fingerprint(encoding)) {
                return a == b;
            }
        }
        false
    }

    /// Whether any fingerprint form of this key equals `fingerprint`.
    fn has_fingerprint(&self, fingerprint: &[u8]) -> bool {
        KeyEncoding::FINGERPRINTS
            .into_iter()
            .filter_map(|encoding| self.fingerprint(encoding))
            .any(|fp| fp == fingerprint)
    }
}

/// Reference-counted handle to a loaded public key.
///
/// Each handle is one reference. The backend's teardown (cache purge, native
/// release) runs exactly once, when the last handle is destroyed.
pub struct KeyHandle {
    inner: Arc<dyn PublicKey>,
}

impl KeyHandle {
    pub fn new<K: PublicKey + 'static>(key: K) -> Self {
        Self {
            inner: Arc::new(key),
        }
    }

    /// Acquire an additional reference.
    pub fn get_ref(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Release this reference.
    pub fn destroy(self) {
        trace!(refs = self.ref_count() - 1, "releasing key reference");
        drop(self);
    }

    /// Number of live references to the underlying key.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether both handles refer to the same key object.
    pub fn ptr_eq(a: &KeyHandle, b: &KeyHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl Clone for KeyHandle {
    fn clone(&self) -> Self {
        self.get_ref()
    }
}

impl Deref for KeyHandle {
    type Target = dyn PublicKey;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("key", &self.inner)
            .field("refs", &self.ref_count())
            .finish()
    }
}
