use std::sync::Arc;

use crate::constants::Id;
use crate::parameters::{Ellipticity, ParameterKind, Position, Radius, SharedComponent};
use crate::primitives::ModelBasis;

/// An astronomical object of a [`Definition`](super::Definition).
///
/// Each parameter component is optional and may be the same instance as another object's
/// component; the grid preserves that sharing. The basis may only be omitted when every
/// frame provides a PSF, in which case the object is modelled as a point source.
#[derive(Debug, Clone)]
pub struct Object {
    id: Id,
    pub(crate) position: Option<SharedComponent<Position>>,
    pub(crate) radius: Option<SharedComponent<Radius>>,
    pub(crate) ellipticity: Option<SharedComponent<Ellipticity>>,
    basis: Option<Arc<dyn ModelBasis>>,
}

impl Object {
    pub fn new(id: Id) -> Self {
        Object {
            id,
            position: None,
            radius: None,
            ellipticity: None,
            basis: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn with_position(mut self, position: SharedComponent<Position>) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_radius(mut self, radius: SharedComponent<Radius>) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_ellipticity(mut self, ellipticity: SharedComponent<Ellipticity>) -> Self {
        self.ellipticity = Some(ellipticity);
        self
    }

    pub fn with_basis(mut self, basis: Arc<dyn ModelBasis>) -> Self {
        self.basis = Some(basis);
        self
    }

    pub fn position(&self) -> Option<&SharedComponent<Position>> {
        self.position.as_ref()
    }

    pub fn radius(&self) -> Option<&SharedComponent<Radius>> {
        self.radius.as_ref()
    }

    pub fn ellipticity(&self) -> Option<&SharedComponent<Ellipticity>> {
        self.ellipticity.as_ref()
    }

    /// Component of kind `K`, if any.
    pub fn component<K: ParameterKind>(&self) -> Option<&SharedComponent<K>> {
        K::definition_slot(self)
    }

    /// Replace (or clear) the component of kind `K`.
    pub fn set_component<K: ParameterKind>(&mut self, component: Option<SharedComponent<K>>) {
        *K::definition_slot_mut(self) = component;
    }

    pub fn basis(&self) -> Option<&Arc<dyn ModelBasis>> {
        self.basis.as_ref()
    }

    pub fn set_basis(&mut self, basis: Option<Arc<dyn ModelBasis>>) {
        self.basis = basis;
    }
}

#[cfg(test)]
mod object_test {
    use nalgebra::Point2;

    use super::*;
    use crate::definition::ParameterComponent;

    #[test]
    fn test_generic_component_access() {
        let radius = ParameterComponent::<Radius>::make(2.0, true);
        let mut obj = Object::new(1)
            .with_position(ParameterComponent::<Position>::make(Point2::new(1.0, 2.0), false))
            .with_radius(Arc::clone(&radius));

        assert!(Arc::ptr_eq(obj.component::<Radius>().unwrap(), &radius));
        assert!(obj.component::<Ellipticity>().is_none());
        assert_eq!(
            obj.component::<Position>().unwrap().value(),
            Point2::new(1.0, 2.0)
        );

        obj.set_component::<Radius>(None);
        assert!(obj.radius().is_none());
    }
}
