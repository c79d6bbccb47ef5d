//! Codec adapter over the native primitives.
//!
//! Everything in here is stateless: hashing, DER codecs for
//! SubjectPublicKeyInfo and ECDSA-Sig-Value, and per-curve EC key material.
//! Failures are reported as [`CodecError`] so callers can log the cause and
//! collapse it into their own `false`/`None` contract.

pub mod asn1;
pub mod ec;
pub mod hash;

pub use asn1::{decode_ec_spki, decode_ecdsa_sig_value, encode_ec_spki};
pub use ec::{EcCurve, EcKeyMaterial};
pub use hash::HashAlgorithm;

use thiserror::Error;

/// Errors raised by the codec adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Malformed DER: {0}")]
    MalformedDer(String),

    #[error("Unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    #[error("Invalid EC point for {0}")]
    InvalidPoint(EcCurve),

    #[error("Invalid signature length: {actual} (expected {expected})")]
    InvalidSignatureLength { expected: usize, actual: usize },

    #[error("Signature component exceeds {field_len} bytes")]
    ComponentTooLarge { field_len: usize },

    #[error("Invalid signature value")]
    InvalidSignature,
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

pub(crate) fn malformed(err: impl std::fmt::Display) -> CodecError {
    CodecError::MalformedDer(err.to_string())
}
