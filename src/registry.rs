//! # Model basis registry
//!
//! Maps names to shared [`ModelBasis`] instances so that definitions assembled from
//! configuration can refer to a basis by name. A registry is cheap to share between
//! threads; registration and lookup take `&self`.
//!
//! ```
//! use std::sync::Arc;
//! use multifit::primitives::{LocalPsf, ModelBasis};
//! use multifit::registry::BasisRegistry;
//!
//! #[derive(Debug)]
//! struct Gaussians(usize);
//!
//! impl ModelBasis for Gaussians {
//!     fn basis_size(&self) -> usize {
//!         self.0
//!     }
//!     fn convolve(&self, _psf: &dyn LocalPsf) -> Arc<dyn ModelBasis> {
//!         Arc::new(Gaussians(self.0))
//!     }
//! }
//!
//! let registry = BasisRegistry::new();
//! assert!(registry.register("gauss3", Arc::new(Gaussians(3))));
//! assert!(!registry.register("gauss3", Arc::new(Gaussians(5))));
//! assert_eq!(registry.lookup("gauss3").unwrap().basis_size(), 3);
//! assert!(registry.lookup("sersic").is_err());
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use log::debug;
use parking_lot::RwLock;

use crate::multifit_errors::MultifitError;
use crate::primitives::ModelBasis;

#[derive(Debug, Default)]
pub struct BasisRegistry {
    entries: RwLock<HashMap<String, Arc<dyn ModelBasis>, RandomState>>,
}

impl BasisRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `basis` under `name`.
    ///
    /// Return
    /// ----------
    /// * `true` if the name was free, `false` if it was already taken. An existing entry is
    ///   never replaced.
    pub fn register(&self, name: &str, basis: Arc<dyn ModelBasis>) -> bool {
        match self.entries.write().entry(name.to_owned()) {
            Entry::Occupied(_) => {
                debug!("basis '{name}' is already registered");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(basis);
                true
            }
        }
    }

    /// Shared handle on the basis registered under `name`.
    ///
    /// Errors
    /// ----------
    /// * [`MultifitError::BasisNotFound`] if nothing is registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ModelBasis>, MultifitError> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| MultifitError::BasisNotFound(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod registry_test {
    use super::*;
    use crate::unit_test_global::MockBasis;

    #[test]
    fn test_first_registration_wins() {
        let registry = BasisRegistry::new();
        let first = MockBasis::new(2);
        assert!(registry.register("disk", Arc::clone(&first)));
        assert!(!registry.register("disk", MockBasis::new(7)));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.lookup("disk").unwrap(), &first));
    }

    #[test]
    fn test_lookup_miss() {
        let registry = BasisRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.lookup("bulge").unwrap_err(),
            MultifitError::BasisNotFound("bulge".into())
        );
    }
}
