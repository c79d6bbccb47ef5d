//! Diffie-Hellman group identifiers (IKEv2 transform type 4).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DhGroup {
    /// 2048-bit MODP group (RFC 3526)
    Modp2048,
    /// NIST P-256 (RFC 5903)
    Ecp256,
    /// NIST P-384 (RFC 5903)
    Ecp384,
    /// Curve25519 (RFC 8031)
    Curve25519,
    /// Any other IANA-assigned group
    Other(u16),
}

impl DhGroup {
    /// IANA transform ID.
    pub fn transform_id(self) -> u16 {
        match self {
            DhGroup::Modp2048 => 14,
            DhGroup::Ecp256 => 19,
            DhGroup::Ecp384 => 20,
            DhGroup::Curve25519 => 31,
            DhGroup::Other(id) => id,
        }
    }

    /// Length of a public value on the wire, if known.
    pub fn public_value_len(self) -> Option<usize> {
        match self {
            DhGroup::Modp2048 => Some(256),
            DhGroup::Ecp256 => Some(64),
            DhGroup::Ecp384 => Some(96),
            DhGroup::Curve25519 => Some(32),
            DhGroup::Other(_) => None,
        }
    }
}

impl From<u16> for DhGroup {
    fn from(id: u16) -> Self {
        match id {
            14 => DhGroup::Modp2048,
            19 => DhGroup::Ecp256,
            20 => DhGroup::Ecp384,
            31 => DhGroup::Curve25519,
            other => DhGroup::Other(other),
        }
    }
}

impl fmt::Display for DhGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhGroup::Modp2048 => f.write_str("MODP_2048"),
            DhGroup::Ecp256 => f.write_str("ECP_256"),
            DhGroup::Ecp384 => f.write_str("ECP_384"),
            DhGroup::Curve25519 => f.write_str("CURVE_25519"),
            DhGroup::Other(id) => write!(f, "DH_GROUP({})", id),
        }
    }
}
