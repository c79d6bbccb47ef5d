//! Keyward key exchange
//!
//! Pluggable Diffie-Hellman providers behind one contract:
//!
//! - [`SoftwareKexProvider`]: Curve25519 and ECP-256 in process
//! - [`HardwareKexProvider`]: delegation to an external key manager session
//! - [`KexRegistry`]: provider selection in configured order

pub mod contract;
pub mod group;
pub mod hardware;
pub mod registry;
pub mod software;

pub use contract::{DiffieHellman, KexError, KexProvider, KexResult, SharedSecret};
pub use group::DhGroup;
pub use hardware::{ContextId, HardwareKexProvider, KeyManagerError, KeyManagerSession};
pub use registry::KexRegistry;
pub use software::SoftwareKexProvider;
