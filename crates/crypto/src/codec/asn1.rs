//! DER codecs: EC SubjectPublicKeyInfo and ECDSA-Sig-Value.

use der::asn1::{AnyRef, BitStringRef, UintRef};
use der::oid::ObjectIdentifier;
use der::{Decode, Encode, Sequence};
use spki::{AlgorithmIdentifierRef, SubjectPublicKeyInfoRef};

use super::ec::{left_pad, EcCurve, EcKeyMaterial};
use super::{malformed, CodecError, CodecResult};

/// id-ecPublicKey (RFC 5480)
const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// `ECDSA-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }`
#[derive(Sequence)]
struct EcdsaSigValue<'a> {
    r: UintRef<'a>,
    s: UintRef<'a>,
}

/// Decode a DER SubjectPublicKeyInfo carrying a named-curve EC key.
pub fn decode_ec_spki(blob: &[u8]) -> CodecResult<EcKeyMaterial> {
    let spki = SubjectPublicKeyInfoRef::from_der(blob).map_err(malformed)?;

    if spki.algorithm.oid != ID_EC_PUBLIC_KEY {
        return Err(CodecError::UnsupportedAlgorithm(spki.algorithm.oid.to_string()));
    }

    let curve_oid = spki.algorithm.parameters_oid().map_err(malformed)?;
    let curve = EcCurve::from_oid(&curve_oid)
        .ok_or_else(|| CodecError::UnsupportedCurve(curve_oid.to_string()))?;

    let point = spki
        .subject_public_key
        .as_bytes()
        .ok_or(CodecError::InvalidPoint(curve))?;

    EcKeyMaterial::from_sec1(curve, point)
}

/// Encode EC key material as DER SubjectPublicKeyInfo, keeping its point form.
pub fn encode_ec_spki(key: &EcKeyMaterial) -> CodecResult<Vec<u8>> {
    let point = key.to_sec1();
    let curve_oid = key.curve().oid();

    let spki = SubjectPublicKeyInfoRef {
        algorithm: AlgorithmIdentifierRef {
            oid: ID_EC_PUBLIC_KEY,
            parameters: Some(AnyRef::from(&curve_oid)),
        },
        subject_public_key: BitStringRef::from_bytes(&point).map_err(malformed)?,
    };

    spki.to_der().map_err(malformed)
}

/// Decode an ECDSA-Sig-Value into fixed-width `r‖s`, each `field_len` bytes.
pub fn decode_ecdsa_sig_value(der: &[u8], field_len: usize) -> CodecResult<Vec<u8>> {
    let sig = EcdsaSigValue::from_der(der).map_err(malformed)?;

    let (r, s) = (sig.r.as_bytes(), sig.s.as_bytes());
    if r.len() > field_len || s.len() > field_len {
        return Err(CodecError::ComponentTooLarge { field_len });
    }

    let mut rs = left_pad(r, field_len);
    rs.extend_from_slice(&left_pad(s, field_len));
    Ok(rs)
}
