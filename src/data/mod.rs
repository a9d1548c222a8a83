//! Attribute stores: where attribute values come from.

pub mod chain;
pub mod env_store;
pub mod file_store;
pub mod memory;
pub mod terraform;

pub use chain::ChainStore;
pub use env_store::{EnvStore, EnvStoreConfig};
pub use file_store::FileStore;
pub use memory::MemoryStore;
pub use terraform::TerraformStore;

use crate::domain::{AttributeKey, ResolvedAttributes};
use crate::error::ResolutionError;
use serde_json::Value;

/// Synchronous key lookup supplied to controls by the harness
pub trait AttributeStore {
    /// Label used in logs and error messages
    fn name(&self) -> &str;

    /// Returns the value for `key`, or `ResolutionError::Missing` when this store does not hold it
    fn resolve(&self, key: &AttributeKey) -> Result<Value, ResolutionError>;
}

impl<S: AttributeStore + ?Sized> AttributeStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&self, key: &AttributeKey) -> Result<Value, ResolutionError> {
        (**self).resolve(key)
    }
}

/// Resolves every key against the store, recording failures instead of stopping
pub fn resolve_all(store: &dyn AttributeStore, keys: &[AttributeKey]) -> ResolvedAttributes {
    let mut resolved = ResolvedAttributes::new();

    for key in keys {
        let value = store.resolve(key);
        match &value {
            Ok(_) => tracing::debug!(key = %key, store = store.name(), "resolved attribute"),
            Err(err) => tracing::debug!(key = %key, store = store.name(), error = %err, "attribute lookup failed"),
        }
        resolved.insert(key.clone(), value);
    }

    resolved
}
