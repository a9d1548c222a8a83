//! Layered lookup across several attribute stores.

use crate::data::AttributeStore;
use crate::domain::AttributeKey;
use crate::error::ResolutionError;
use serde_json::Value;

/// Consults stores in order; the first store holding a key wins.
///
/// Only `Missing` falls through to the next store. Any other error means a
/// store that should have answered could not, and is returned as-is.
#[derive(Default)]
pub struct ChainStore {
    stores: Vec<Box<dyn AttributeStore>>,
}

impl ChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, store: Box<dyn AttributeStore>) {
        self.stores.push(store);
    }

    pub fn with(mut self, store: impl AttributeStore + 'static) -> Self {
        self.push(Box::new(store));
        self
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn store_names(&self) -> Vec<&str> {
        self.stores.iter().map(|store| store.name()).collect()
    }
}

impl AttributeStore for ChainStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn resolve(&self, key: &AttributeKey) -> Result<Value, ResolutionError> {
        for store in &self.stores {
            match store.resolve(key) {
                Err(err) if err.is_missing() => continue,
                result => return result,
            }
        }
        Err(ResolutionError::missing(key))
    }
}
