//! Generic construction protocol for pluggable key objects.
//!
//! A caller asks a [`BuilderRegistry`] for a builder, feeds it typed
//! [`BuilderPart`]s and calls [`Builder::build`] once. Backends share the
//! [`ConstructionState`] machine, which honours at most one construction
//! attempt: anything after it, or any part the backend does not recognise,
//! cancels the builder and drops whatever it held.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::cache::FingerprintCache;
use crate::ec_public_key::EcPublicKeyBuilder;
use crate::public_key::KeyHandle;
use crate::scheme::KeyType;

/// One typed input to a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderPart {
    /// DER encoded blob, e.g. SubjectPublicKeyInfo
    BlobAsn1Der(Vec<u8>),
    /// PEM armored text
    BlobPem(String),
}

impl BuilderPart {
    pub fn kind(&self) -> &'static str {
        match self {
            BuilderPart::BlobAsn1Der(_) => "BLOB_ASN1_DER",
            BuilderPart::BlobPem(_) => "BLOB_PEM",
        }
    }
}

/// Progress of a single construction.
#[derive(Debug)]
pub enum ConstructionState<T> {
    /// No construction attempted yet
    Accumulating,
    /// Construction succeeded
    Completed(T),
    /// Construction was attempted and failed
    Failed,
    /// Builder was cancelled; nothing will be built
    Cancelled,
}

impl<T> Default for ConstructionState<T> {
    fn default() -> Self {
        ConstructionState::Accumulating
    }
}

impl<T> ConstructionState<T> {
    pub fn is_accumulating(&self) -> bool {
        matches!(self, ConstructionState::Accumulating)
    }

    /// Make the one construction attempt, or cancel if it was already made.
    pub fn attempt<F>(&mut self, construct: F)
    where
        F: FnOnce() -> Option<T>,
    {
        if !self.is_accumulating() {
            self.cancel();
            return;
        }
        *self = match construct() {
            Some(object) => ConstructionState::Completed(object),
            None => ConstructionState::Failed,
        };
    }

    /// Drop any held object and refuse further input.
    pub fn cancel(&mut self) {
        *self = ConstructionState::Cancelled;
    }

    /// Consume the state, yielding the object only if construction completed.
    pub fn into_output(self) -> Option<T> {
        match self {
            ConstructionState::Completed(object) => Some(object),
            _ => None,
        }
    }
}

/// Incremental builder for one object.
pub trait Builder: Send {
    type Output;

    /// Feed one part.
    fn add(&mut self, part: BuilderPart);

    /// Finish; consumes the builder.
    fn build(self: Box<Self>) -> Option<Self::Output>;
}

/// Backend factory: returns a builder if it handles the requested key type.
pub type BuilderConstructor<T> =
    Box<dyn Fn(KeyType) -> Option<Box<dyn Builder<Output = T>>> + Send + Sync>;

/// Registered builder backends, in priority order.
pub struct BuilderRegistry<T> {
    backends: Vec<(String, BuilderConstructor<T>)>,
}

impl<T> Default for BuilderRegistry<T> {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
        }
    }
}

impl<T> BuilderRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend after all existing ones.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(KeyType) -> Option<Box<dyn Builder<Output = T>>> + Send + Sync + 'static,
    {
        self.backends.push((name.into(), Box::new(constructor)));
    }

    /// Names of registered backends, in priority order.
    pub fn backends(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(|(name, _)| name.as_str())
    }

    /// Builder from the first backend that handles `key_type`.
    pub fn builder(&self, key_type: KeyType) -> Option<Box<dyn Builder<Output = T>>> {
        self.backends
            .iter()
            .find_map(|(_, constructor)| constructor(key_type))
    }

    /// Feed `parts` to each backend handling `key_type` until one builds.
    pub fn load(&self, key_type: KeyType, parts: &[BuilderPart]) -> Option<T> {
        for (name, constructor) in &self.backends {
            let Some(mut builder) = constructor(key_type) else {
                continue;
            };
            for part in parts {
                builder.add(part.clone());
            }
            if let Some(object) = builder.build() {
                debug!(backend = %name, %key_type, "loaded object");
                return Some(object);
            }
        }
        debug!(%key_type, parts = parts.len(), "no backend could build object");
        None
    }
}

impl BuilderRegistry<KeyHandle> {
    /// Registry with every public key backend of this crate.
    pub fn with_defaults(cache: Arc<FingerprintCache>) -> Self {
        let mut registry = Self::new();
        registry.register("ec-public-key", move |key_type| {
            EcPublicKeyBuilder::for_type(key_type, Arc::clone(&cache))
                .map(|builder| Box::new(builder) as Box<dyn Builder<Output = KeyHandle>>)
        });
        registry
    }
}

impl<T> fmt::Debug for BuilderRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.backends()).finish()
    }
}
