//! # Model definition
//!
//! A [`Definition`] is the mutable, user-authored description of a fit: the [`Frame`]s
//! (observations) and the [`Object`]s observed in them, plus an optional WCS for the
//! coordinates in which object positions are expressed.
//!
//! Frames and objects are keyed by their [`Id`]; both collections iterate in ascending
//! id order, which is the order used by the [`Grid`](crate::grid::Grid) built from the
//! definition.
//!
//! ## Sharing
//!
//! Parameter components are [`SharedComponent`](crate::parameters::SharedComponent)
//! handles. Attaching the same handle to two objects ties their parameters together:
//! the grid gives them a single offset in the parameter vector.
//!
//! ```rust
//! use std::sync::Arc;
//! use multifit::definition::{Definition, Object, ParameterComponent};
//! use multifit::parameters::Radius;
//!
//! let radius = ParameterComponent::<Radius>::make(1.5, true);
//! let mut def = Definition::new(None);
//! def.add_object(Object::new(1).with_radius(Arc::clone(&radius)));
//! def.add_object(Object::new(2).with_radius(radius));
//! assert_eq!(def.object_count(), 2);
//! ```

pub mod frame;
pub mod object;
pub mod parameter_component;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::Id;
use crate::primitives::Wcs;

pub use frame::Frame;
pub use object::Object;
pub use parameter_component::ParameterComponent;

#[derive(Debug, Clone, Default)]
pub struct Definition {
    wcs: Option<Arc<dyn Wcs>>,
    frames: BTreeMap<Id, Frame>,
    objects: BTreeMap<Id, Object>,
}

impl Definition {
    pub fn new(wcs: Option<Arc<dyn Wcs>>) -> Self {
        Definition {
            wcs,
            frames: BTreeMap::new(),
            objects: BTreeMap::new(),
        }
    }

    pub fn wcs(&self) -> Option<&Arc<dyn Wcs>> {
        self.wcs.as_ref()
    }

    pub fn set_wcs(&mut self, wcs: Option<Arc<dyn Wcs>>) {
        self.wcs = wcs;
    }

    /// Insert a frame. Returns false, leaving the definition unchanged, if a frame with
    /// the same id is already present.
    pub fn add_frame(&mut self, frame: Frame) -> bool {
        match self.frames.entry(frame.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(frame);
                true
            }
        }
    }

    /// Insert an object. Returns false, leaving the definition unchanged, if an object
    /// with the same id is already present.
    pub fn add_object(&mut self, object: Object) -> bool {
        match self.objects.entry(object.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(object);
                true
            }
        }
    }

    pub fn remove_frame(&mut self, id: Id) -> Option<Frame> {
        self.frames.remove(&id)
    }

    pub fn remove_object(&mut self, id: Id) -> Option<Object> {
        self.objects.remove(&id)
    }

    pub fn frame(&self, id: Id) -> Option<&Frame> {
        self.frames.get(&id)
    }

    pub fn object(&self, id: Id) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: Id) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    /// Frames in ascending id order.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = &Frame> {
        self.frames.values()
    }

    /// Objects in ascending id order.
    pub fn objects(&self) -> impl ExactSizeIterator<Item = &Object> {
        self.objects.values()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
