//! End-to-end tests across the Keyward crates
//!
//! This test suite validates:
//! - Loading peer keys through the builder registry and verifying signatures
//! - Fingerprint caching and purge across shared key handles
//! - Key exchange provider selection from configuration
//! - Hardware key manager delegation, failure mapping and context release


#[cfg(test)]
mod key_lifecycle_tests;

#[cfg(test)]
mod kex_provider_tests;
