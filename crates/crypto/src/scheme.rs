//! Key types, signature schemes and encoding requests.
//!
//! These enums are the shared vocabulary between the protocol engine and the
//! key backends. A backend supports a subset of each; anything outside that
//! subset is answered with `false` or `None`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Public key algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Wildcard used when requesting a builder for whatever backend can parse the input.
    Any,
    Rsa,
    Ecdsa,
    Ed25519,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Any => "ANY",
            KeyType::Rsa => "RSA",
            KeyType::Ecdsa => "ECDSA",
            KeyType::Ed25519 => "ED25519",
        };
        f.write_str(name)
    }
}

/// Signature scheme: algorithm, hash and wire encoding.
///
/// Converts from the numeric identifier used in configuration and IPC;
/// unassigned numbers are kept as [`SignatureScheme::Unknown`] so they can be
/// reported rather than silently mapped to a supported scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// ECDSA over a caller-supplied digest, `r‖s` encoding
    EcdsaWithNull,
    /// ECDSA with SHA-1, DER ECDSA-Sig-Value encoding
    EcdsaWithSha1Der,
    /// ECDSA on P-256 with SHA-256, `r‖s` encoding (RFC 4754)
    Ecdsa256,
    /// ECDSA on P-384 with SHA-384, `r‖s` encoding (RFC 4754)
    Ecdsa384,
    /// ECDSA on P-521 with SHA-512, `r‖s` encoding (RFC 4754)
    Ecdsa521,
    RsaEmsaPkcs1Sha1,
    RsaEmsaPkcs1Sha256,
    Ed25519,
    Unknown(u16),
}

impl SignatureScheme {
    /// Numeric identifier of this scheme.
    pub fn code(self) -> u16 {
        match self {
            SignatureScheme::EcdsaWithNull => 1,
            SignatureScheme::EcdsaWithSha1Der => 2,
            SignatureScheme::Ecdsa256 => 3,
            SignatureScheme::Ecdsa384 => 4,
            SignatureScheme::Ecdsa521 => 5,
            SignatureScheme::RsaEmsaPkcs1Sha1 => 6,
            SignatureScheme::RsaEmsaPkcs1Sha256 => 7,
            SignatureScheme::Ed25519 => 8,
            SignatureScheme::Unknown(code) => code,
        }
    }
}

impl From<u16> for SignatureScheme {
    fn from(code: u16) -> Self {
        match code {
            1 => SignatureScheme::EcdsaWithNull,
            2 => SignatureScheme::EcdsaWithSha1Der,
            3 => SignatureScheme::Ecdsa256,
            4 => SignatureScheme::Ecdsa384,
            5 => SignatureScheme::Ecdsa521,
            6 => SignatureScheme::RsaEmsaPkcs1Sha1,
            7 => SignatureScheme::RsaEmsaPkcs1Sha256,
            8 => SignatureScheme::Ed25519,
            other => SignatureScheme::Unknown(other),
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureScheme::EcdsaWithNull => f.write_str("ECDSA_WITH_NULL"),
            SignatureScheme::EcdsaWithSha1Der => f.write_str("ECDSA_WITH_SHA1_DER"),
            SignatureScheme::Ecdsa256 => f.write_str("ECDSA-256"),
            SignatureScheme::Ecdsa384 => f.write_str("ECDSA-384"),
            SignatureScheme::Ecdsa521 => f.write_str("ECDSA-521"),
            SignatureScheme::RsaEmsaPkcs1Sha1 => f.write_str("RSA_EMSA_PKCS1_SHA1"),
            SignatureScheme::RsaEmsaPkcs1Sha256 => f.write_str("RSA_EMSA_PKCS1_SHA256"),
            SignatureScheme::Ed25519 => f.write_str("ED25519"),
            SignatureScheme::Unknown(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

/// Requested output form of a key: a full encoding or an identity fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEncoding {
    /// DER SubjectPublicKeyInfo
    PubSpkiAsn1Der,
    /// Algorithm-specific DER public key (e.g. PKCS#1)
    PubAsn1Der,
    /// PEM-armored SubjectPublicKeyInfo
    PubPem,
    /// SHA-1 over the raw public key (for EC: the SEC1 point)
    PubkeySha1,
    /// SHA-1 over the DER SubjectPublicKeyInfo
    PubkeyInfoSha1,
    /// OpenPGP v4 fingerprint
    PgpFingerprint,
}

impl KeyEncoding {
    /// Identity fingerprint forms, in the order used for key comparison.
    pub const FINGERPRINTS: [KeyEncoding; 3] = [
        KeyEncoding::PubkeyInfoSha1,
        KeyEncoding::PubkeySha1,
        KeyEncoding::PgpFingerprint,
    ];

    pub fn is_fingerprint(self) -> bool {
        Self::FINGERPRINTS.contains(&self)
    }
}
