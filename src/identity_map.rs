use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;

use crate::parameters::ComponentKey;

/// Association from a source-side component instance (by [`ComponentKey`]) to its single
/// canonical target-side counterpart.
///
/// The grid builder uses one map per parameter kind with definition components as keys;
/// the reconstructor uses the reverse direction, keyed by grid components.
#[derive(Debug, Clone)]
pub(crate) struct IdentityMap<T> {
    canonical: HashMap<ComponentKey, Arc<T>, RandomState>,
}

impl<T> Default for IdentityMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IdentityMap<T> {
    pub(crate) fn new() -> Self {
        Self {
            canonical: HashMap::default(),
        }
    }

    /// Return the counterpart registered for `key`, creating it with `make` on first sight.
    ///
    /// Return
    /// ----------
    /// * `(canonical, is_new)`: `is_new` is true iff `make` was called.
    pub(crate) fn register_with<F>(&mut self, key: ComponentKey, make: F) -> (Arc<T>, bool)
    where
        F: FnOnce() -> T,
    {
        match self.canonical.entry(key) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => (Arc::clone(entry.insert(Arc::new(make()))), true),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.canonical.len()
    }
}
