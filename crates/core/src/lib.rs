//! Core functionality shared by the Keyward crates.
//!
//! This crate provides the ambient pieces used across the key-handling layer:
//! error types, logging initialization and configuration loading.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CacheConfig, Config, HardwareConfig, KexConfig, ProviderKind};
pub use error::{CoreError, Result};
