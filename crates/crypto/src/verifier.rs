//! ECDSA signature verification with scheme dispatch.
//!
//! Two wire encodings exist for the same algorithm family. RFC 4754 schemes
//! carry a fixed-width `r‖s`; the legacy SHA-1 scheme carries a DER
//! ECDSA-Sig-Value that some peers prefix with stray zero bytes. Both are
//! normalised to `r‖s` before the native primitive runs.

use std::borrow::Cow;
use tracing::{debug, warn};

use crate::codec::{decode_ecdsa_sig_value, CodecError, CodecResult, EcKeyMaterial, HashAlgorithm};
use crate::scheme::SignatureScheme;

/// How a scheme encodes `(r, s)` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireEncoding {
    /// Fixed-width big-endian `r‖s`
    Concatenated,
    /// DER ECDSA-Sig-Value, leading zero bytes tolerated
    Der,
}

/// Hash and wire encoding of the schemes an EC key accepts.
fn dispatch(scheme: SignatureScheme) -> Option<(Option<HashAlgorithm>, WireEncoding)> {
    match scheme {
        SignatureScheme::EcdsaWithNull => Some((None, WireEncoding::Concatenated)),
        SignatureScheme::EcdsaWithSha1Der => Some((Some(HashAlgorithm::Sha1), WireEncoding::Der)),
        SignatureScheme::Ecdsa256 => Some((Some(HashAlgorithm::Sha256), WireEncoding::Concatenated)),
        SignatureScheme::Ecdsa384 => Some((Some(HashAlgorithm::Sha384), WireEncoding::Concatenated)),
        SignatureScheme::Ecdsa521 => Some((Some(HashAlgorithm::Sha512), WireEncoding::Concatenated)),
        _ => None,
    }
}

/// Validate a concatenated `r‖s` signature against the field size.
fn concatenated(signature: &[u8], field_len: usize) -> CodecResult<Vec<u8>> {
    let expected = 2 * field_len;
    if signature.len() != expected {
        return Err(CodecError::InvalidSignatureLength {
            expected,
            actual: signature.len(),
        });
    }
    Ok(signature.to_vec())
}

/// Strip leading zero bytes, then decode the DER structure.
fn structured(signature: &[u8], field_len: usize) -> CodecResult<Vec<u8>> {
    let start = signature
        .iter()
        .position(|&b| b != 0x00)
        .unwrap_or(signature.len());
    decode_ecdsa_sig_value(&signature[start..], field_len)
}

/// Verify `signature` over `data` with `key` under `scheme`.
///
/// Unsupported schemes log a warning; malformed signatures fail quietly.
pub fn verify_signature(
    key: &EcKeyMaterial,
    scheme: SignatureScheme,
    data: &[u8],
    signature: &[u8],
) -> bool {
    let Some((hash, encoding)) = dispatch(scheme) else {
        warn!(%scheme, code = scheme.code(), "signature scheme not supported in EC");
        return false;
    };

    let field_len = key.curve().field_len();
    let rs = match encoding {
        WireEncoding::Concatenated => concatenated(signature, field_len),
        WireEncoding::Der => structured(signature, field_len),
    };
    let rs = match rs {
        Ok(rs) => rs,
        Err(e) => {
            debug!(%scheme, error = %e, "rejecting malformed EC signature");
            return false;
        }
    };

    let digest = match hash {
        Some(alg) => Cow::Owned(alg.digest(data)),
        None => Cow::Borrowed(data),
    };

    match key.verify_prehash(&digest, &rs) {
        Ok(valid) => valid,
        Err(e) => {
            debug!(%scheme, error = %e, "EC signature value rejected");
            false
        }
    }
}
