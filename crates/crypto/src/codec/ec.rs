//! Per-curve elliptic-curve key material.

use der::oid::ObjectIdentifier;
use signature::hazmat::PrehashVerifier;
use std::fmt;

use super::{CodecError, CodecResult};

const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

/// Named curves with a verification backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    /// Byte length of a field element (and of each `r`/`s` component).
    pub const fn field_len(self) -> usize {
        match self {
            EcCurve::P256 => 32,
            EcCurve::P384 => 48,
            EcCurve::P521 => 66,
        }
    }

    /// namedCurve OID used in SubjectPublicKeyInfo parameters.
    pub const fn oid(self) -> ObjectIdentifier {
        match self {
            EcCurve::P256 => SECP256R1,
            EcCurve::P384 => SECP384R1,
            EcCurve::P521 => SECP521R1,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [EcCurve::P256, EcCurve::P384, EcCurve::P521]
            .into_iter()
            .find(|curve| curve.oid() == *oid)
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
            EcCurve::P521 => "P-521",
        };
        f.write_str(name)
    }
}

/// Validated public point on one of the supported curves.
///
/// This is the native key handle: it is built once and never mutated. The
/// SEC1 point form it was parsed from is kept so re-encodings match the input.
#[derive(Clone)]
pub struct EcKeyMaterial {
    key: CurveKey,
    compressed: bool,
}

#[derive(Clone)]
enum CurveKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

impl EcKeyMaterial {
    /// Parse a SEC1 encoded point (compressed or uncompressed).
    pub fn from_sec1(curve: EcCurve, point: &[u8]) -> CodecResult<Self> {
        let invalid = |_| CodecError::InvalidPoint(curve);
        let key = match curve {
            EcCurve::P256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
                .map(CurveKey::P256)
                .map_err(invalid)?,
            EcCurve::P384 => p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
                .map(CurveKey::P384)
                .map_err(invalid)?,
            EcCurve::P521 => p521::ecdsa::VerifyingKey::from_sec1_bytes(point)
                .map(CurveKey::P521)
                .map_err(invalid)?,
        };
        let compressed = matches!(point.first(), Some(0x02 | 0x03));
        Ok(Self { key, compressed })
    }

    pub fn curve(&self) -> EcCurve {
        match self.key {
            CurveKey::P256(_) => EcCurve::P256,
            CurveKey::P384(_) => EcCurve::P384,
            CurveKey::P521(_) => EcCurve::P521,
        }
    }

    /// Whether the point was parsed from compressed form.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// SEC1 point in the form it was parsed from.
    pub fn to_sec1(&self) -> Vec<u8> {
        let compress = self.compressed;
        match &self.key {
            CurveKey::P256(vk) => vk.to_encoded_point(compress).as_bytes().to_vec(),
            CurveKey::P384(vk) => vk.to_encoded_point(compress).as_bytes().to_vec(),
            CurveKey::P521(vk) => vk.to_encoded_point(compress).as_bytes().to_vec(),
        }
    }

    /// Verify a fixed-width `r‖s` signature over a digest.
    ///
    /// Digests shorter than the field are left-padded, matching how ECDSA
    /// converts a short hash to an integer. Returns an error only when `rs`
    /// is not a valid signature value for this curve.
    pub fn verify_prehash(&self, prehash: &[u8], rs: &[u8]) -> CodecResult<bool> {
        let field_len = self.curve().field_len();
        let padded;
        let prehash = if prehash.len() < field_len {
            padded = left_pad(prehash, field_len);
            padded.as_slice()
        } else {
            prehash
        };

        let valid = match &self.key {
            CurveKey::P256(vk) => {
                let sig = p256::ecdsa::Signature::from_slice(rs)
                    .map_err(|_| CodecError::InvalidSignature)?;
                vk.verify_prehash(prehash, &sig).is_ok()
            }
            CurveKey::P384(vk) => {
                let sig = p384::ecdsa::Signature::from_slice(rs)
                    .map_err(|_| CodecError::InvalidSignature)?;
                vk.verify_prehash(prehash, &sig).is_ok()
            }
            CurveKey::P521(vk) => {
                let sig = p521::ecdsa::Signature::from_slice(rs)
                    .map_err(|_| CodecError::InvalidSignature)?;
                vk.verify_prehash(prehash, &sig).is_ok()
            }
        };
        Ok(valid)
    }
}

impl fmt::Debug for EcKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcKeyMaterial")
            .field("curve", &self.curve())
            .field("point", &hex::encode(self.to_sec1()))
            .finish()
    }
}

/// Left-pad a big-endian integer to `width` bytes. `bytes` must not exceed `width`.
pub(crate) fn left_pad(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = vec![0u8; width.saturating_sub(bytes.len())];
    out.extend_from_slice(bytes);
    out
}
