//! Public-key abstraction and verification engine for Keyward.
//!
//! This crate holds the key-handling core used by the negotiation engine:
//! loading public keys from encoded blobs, verifying signatures, producing
//! canonical encodings and fingerprints, and sharing loaded keys safely
//! between negotiation contexts.
//!
//! # Core Capabilities
//!
//! - **Public keys**: the [`PublicKey`] capability set behind a reference
//!   counted [`KeyHandle`]
//! - **Signature verification**: ECDSA on P-256, P-384 and P-521 with both
//!   the RFC 4754 `r‖s` encoding and the legacy DER encoding
//! - **Fingerprints**: SHA-1 key identifiers memoised in a shared
//!   [`FingerprintCache`]
//! - **Construction**: the [`Builder`] protocol and [`BuilderRegistry`] that
//!   decouple "load a key from bytes" from the backend that does it
//!
//! # Error Model
//!
//! Public operations answer with `bool` or `Option`. Malformed input is an
//! expected condition and is only logged at `debug`; an unsupported signature
//! scheme indicates a caller defect and is logged at `warn`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use keyward_crypto::{BuilderPart, BuilderRegistry, FingerprintCache, KeyType, SignatureScheme};
//!
//! # fn run(spki_der: Vec<u8>, data: &[u8], sig: &[u8]) -> Option<()> {
//! let cache = Arc::new(FingerprintCache::new());
//! let registry = BuilderRegistry::with_defaults(cache);
//!
//! let key = registry.load(KeyType::Ecdsa, &[BuilderPart::BlobAsn1Der(spki_der)])?;
//! if key.verify(SignatureScheme::Ecdsa256, data, sig) {
//!     tracing::info!("peer authenticated");
//! }
//! key.destroy();
//! # Some(())
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod codec;
pub mod ec_public_key;
pub mod public_key;
pub mod scheme;
pub mod verifier;

pub use builder::{Builder, BuilderConstructor, BuilderPart, BuilderRegistry, ConstructionState};
pub use cache::{CacheStats, FingerprintCache, KeyIdentity};
pub use codec::{CodecError, CodecResult, EcCurve, EcKeyMaterial, HashAlgorithm};
pub use ec_public_key::{ec_fingerprint, EcPublicKey, EcPublicKeyBuilder};
pub use public_key::{KeyHandle, PublicKey};
pub use scheme::{KeyEncoding, KeyType, SignatureScheme};
pub use verifier::verify_signature;
