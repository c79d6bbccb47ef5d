//! Peer key lifecycle
//!
//! Loads peer keys the way the negotiation engine does, through the builder
//! registry, and checks verification, fingerprints and cache hygiene across
//! handles shared between negotiation threads.

use crate::test_utils::{init_tracing, P256Peer, P384Peer};
use anyhow::{anyhow, Result};
use keyward_core::Config;
use keyward_crypto::{
    BuilderPart, BuilderRegistry, FingerprintCache, KeyEncoding, KeyHandle, KeyType,
    SignatureScheme,
};
use sha1::{Digest, Sha1};
use std::sync::Arc;
use std::thread;

const AUTH_OCTETS: &[u8] = b"IKE_AUTH signed octets";

fn registry_from(config: &Config) -> (Arc<FingerprintCache>, BuilderRegistry<KeyHandle>) {
    let cache = Arc::new(FingerprintCache::from_config(&config.cache));
    let registry = BuilderRegistry::with_defaults(Arc::clone(&cache));
    (cache, registry)
}

fn load(registry: &BuilderRegistry<KeyHandle>, spki: Vec<u8>) -> Result<KeyHandle> {
    registry
        .load(KeyType::Any, &[BuilderPart::BlobAsn1Der(spki)])
        .ok_or_else(|| anyhow!("peer key did not load"))
}

#[test]
fn test_peer_authentication_with_both_encodings() -> Result<()> {
    init_tracing();
    let (_cache, registry) = registry_from(&Config::default());
    let peer = P256Peer::generate();
    let key = load(&registry, peer.spki_der())?;

    assert_eq!(key.key_type(), KeyType::Ecdsa);
    assert_eq!(key.keysize(), 32);

    let rfc4754 = peer.sign_ecdsa256(AUTH_OCTETS);
    assert!(key.verify(SignatureScheme::Ecdsa256, AUTH_OCTETS, &rfc4754));

    let legacy = peer.sign_sha1_der(AUTH_OCTETS);
    assert!(key.verify(SignatureScheme::EcdsaWithSha1Der, AUTH_OCTETS, &legacy));

    // Some peers prefix the legacy encoding with zero bytes.
    let mut padded = vec![0u8, 0u8];
    padded.extend_from_slice(&legacy);
    assert!(key.verify(SignatureScheme::EcdsaWithSha1Der, AUTH_OCTETS, &padded));

    // Encodings are not interchangeable.
    assert!(!key.verify(SignatureScheme::Ecdsa256, AUTH_OCTETS, &legacy));
    assert!(!key.verify(SignatureScheme::EcdsaWithSha1Der, AUTH_OCTETS, &rfc4754));

    assert!(!key.verify(SignatureScheme::Ecdsa256, b"tampered octets", &rfc4754));
    assert!(!key.verify(SignatureScheme::RsaEmsaPkcs1Sha256, AUTH_OCTETS, &rfc4754));

    key.destroy();
    Ok(())
}

#[test]
fn test_p384_peer() -> Result<()> {
    init_tracing();
    let (_cache, registry) = registry_from(&Config::default());
    let peer = P384Peer::generate();
    let key = load(&registry, peer.spki_der())?;

    assert_eq!(key.keysize(), 48);
    let sig = peer.sign_ecdsa384(AUTH_OCTETS);
    assert_eq!(sig.len(), 96);
    assert!(key.verify(SignatureScheme::Ecdsa384, AUTH_OCTETS, &sig));
    assert!(!key.verify(SignatureScheme::Ecdsa256, AUTH_OCTETS, &sig[..64]));
    Ok(())
}

#[test]
fn test_fingerprints_match_published_identifiers() -> Result<()> {
    init_tracing();
    let (cache, registry) = registry_from(&Config::default());
    let peer = P256Peer::generate();
    let spki = peer.spki_der();
    let key = load(&registry, spki.clone())?;

    let subject_key_id = Sha1::digest(peer.sec1_point()).to_vec();
    let spki_id = Sha1::digest(&spki).to_vec();

    assert_eq!(key.fingerprint(KeyEncoding::PubkeySha1), Some(subject_key_id.clone()));
    assert_eq!(key.fingerprint(KeyEncoding::PubkeyInfoSha1), Some(spki_id.clone()));
    assert_eq!(key.fingerprint(KeyEncoding::PgpFingerprint), None);
    assert_eq!(key.encoding(KeyEncoding::PubSpkiAsn1Der), Some(spki));

    assert!(key.has_fingerprint(&subject_key_id));
    assert!(key.has_fingerprint(&spki_id));
    assert!(!key.has_fingerprint(&[0u8; 20]));

    // Second lookups are served from the cache.
    let before = cache.stats();
    key.fingerprint(KeyEncoding::PubkeySha1);
    assert_eq!(cache.stats().hits, before.hits + 1);
    Ok(())
}

#[test]
fn test_same_key_loaded_twice_is_equal() -> Result<()> {
    init_tracing();
    let (_cache, registry) = registry_from(&Config::default());
    let peer = P256Peer::generate();
    let a = load(&registry, peer.spki_der())?;
    let b = load(&registry, peer.spki_der())?;
    let other = load(&registry, P256Peer::generate().spki_der())?;

    assert!(!KeyHandle::ptr_eq(&a, &b));
    assert!(a.equals(&*b));
    assert!(!a.equals(&*other));
    Ok(())
}

#[test]
fn test_shared_handle_purges_cache_once_released() -> Result<()> {
    init_tracing();
    let (cache, registry) = registry_from(&Config::default());
    let peer = P256Peer::generate();
    let key = load(&registry, peer.spki_der())?;
    let sig = peer.sign_ecdsa256(AUTH_OCTETS);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let handle = key.get_ref();
            let sig = sig.clone();
            thread::spawn(move || {
                let ok = handle.verify(SignatureScheme::Ecdsa256, AUTH_OCTETS, &sig);
                let fp = handle.fingerprint(KeyEncoding::PubkeyInfoSha1);
                handle.destroy();
                (ok, fp)
            })
        })
        .collect();

    let mut fingerprints = Vec::new();
    for worker in workers {
        let (ok, fp) = worker.join().map_err(|_| anyhow!("worker panicked"))?;
        assert!(ok);
        fingerprints.push(fp.ok_or_else(|| anyhow!("missing fingerprint"))?);
    }
    assert!(fingerprints.windows(2).all(|w| w[0] == w[1]));

    // The original handle still holds the key and its cache entries.
    assert_eq!(key.ref_count(), 1);
    assert!(!cache.is_empty());

    key.destroy();
    assert!(cache.is_empty());
    Ok(())
}

#[test]
fn test_disabled_cache_gives_identical_fingerprints() -> Result<()> {
    init_tracing();
    let config = Config::from_toml_str("[cache]\nenabled = false\n")?;
    let (cache, registry) = registry_from(&config);
    let (_, cached_registry) = registry_from(&Config::default());

    let peer = P256Peer::generate();
    let uncached = load(&registry, peer.spki_der())?;
    let cached = load(&cached_registry, peer.spki_der())?;

    for encoding in [KeyEncoding::PubkeySha1, KeyEncoding::PubkeyInfoSha1] {
        let first = uncached.fingerprint(encoding);
        assert!(first.is_some());
        assert_eq!(first, uncached.fingerprint(encoding));
        assert_eq!(first, cached.fingerprint(encoding));
    }
    assert!(cache.is_empty());
    Ok(())
}

#[test]
fn test_builder_honours_one_attempt() {
    init_tracing();
    let (_cache, registry) = registry_from(&Config::default());
    let peer = P256Peer::generate();

    let mut builder = registry.builder(KeyType::Ecdsa).expect("EC backend registered");
    builder.add(BuilderPart::BlobAsn1Der(peer.spki_der()));
    builder.add(BuilderPart::BlobAsn1Der(peer.spki_der()));
    assert!(builder.build().is_none());

    let mut builder = registry.builder(KeyType::Ecdsa).expect("EC backend registered");
    builder.add(BuilderPart::BlobAsn1Der(vec![0x30, 0x03, 0x02, 0x01, 0x00]));
    assert!(builder.build().is_none());

    let mut builder = registry.builder(KeyType::Ecdsa).expect("EC backend registered");
    builder.add(BuilderPart::BlobPem("-----BEGIN PUBLIC KEY-----".into()));
    assert!(builder.build().is_none());

    assert!(registry.builder(KeyType::Rsa).is_none());
}
