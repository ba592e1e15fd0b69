use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::parameters::{ComponentKey, ParameterKind, SharedComponent};

#[derive(Debug, Clone, Copy)]
struct ComponentState<V> {
    value: V,
    active: bool,
}

/// Mutable, shareable parameter component of a [`Definition`](crate::definition::Definition).
///
/// Components are handed out as [`SharedComponent`] (`Arc`) handles and may be attached
/// to several objects. The value and the active flag live behind a lock: a change made
/// through one handle is seen by every object holding the same instance. Reads return
/// copies.
pub struct ParameterComponent<K: ParameterKind> {
    key: ComponentKey,
    state: RwLock<ComponentState<K::Value>>,
}

impl<K: ParameterKind> ParameterComponent<K> {
    /// Create a new component instance with a fresh identity.
    pub fn make(value: K::Value, active: bool) -> SharedComponent<K> {
        Arc::new(Self::new(value, active))
    }

    pub(crate) fn new(value: K::Value, active: bool) -> Self {
        ParameterComponent {
            key: ComponentKey::next(),
            state: RwLock::new(ComponentState { value, active }),
        }
    }

    pub fn key(&self) -> ComponentKey {
        self.key
    }

    pub fn value(&self) -> K::Value {
        self.state.read().value
    }

    pub fn set_value(&self, value: K::Value) {
        self.state.write().value = value;
    }

    pub fn is_active(&self) -> bool {
        self.state.read().active
    }

    pub fn set_active(&self, active: bool) {
        self.state.write().active = active;
    }

    /// Value and active flag read under a single lock acquisition.
    pub(crate) fn snapshot(&self) -> (K::Value, bool) {
        let state = self.state.read();
        (state.value, state.active)
    }
}

impl<K: ParameterKind> fmt::Debug for ParameterComponent<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, active) = self.snapshot();
        f.debug_struct("ParameterComponent")
            .field("kind", &K::NAME)
            .field("key", &self.key)
            .field("value", &value)
            .field("active", &active)
            .finish()
    }
}
