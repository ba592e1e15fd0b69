use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::constants::Id;
use crate::definition;
use crate::multifit_errors::MultifitError;
use crate::parameters::{Ellipticity, GridComponent, ParameterKind, Position, Radius};
use crate::primitives::ModelBasis;

use super::frame::Frame;

/// An object of a [`Grid`](super::Grid).
///
/// Parameter components are shared handles: objects that shared a component in the
/// definition hold the very same grid component. The object's sources occupy a
/// contiguous range of the grid's source array, one per frame in frame order.
#[derive(Debug)]
pub struct Object {
    id: Id,
    pub(crate) position: Option<GridComponent<Position>>,
    pub(crate) radius: Option<GridComponent<Radius>>,
    pub(crate) ellipticity: Option<GridComponent<Ellipticity>>,
    basis: Option<Arc<dyn ModelBasis>>,
    coefficient_offset: usize,
    coefficient_count: usize,
    pub(crate) sources: Range<usize>,
}

impl Object {
    /// Components are attached afterwards by the builder, once deduplicated.
    pub(crate) fn from_definition(def: &definition::Object, coefficient_offset: usize) -> Self {
        let basis = def.basis().cloned();
        Object {
            id: def.id(),
            position: None,
            radius: None,
            ellipticity: None,
            coefficient_count: basis.as_ref().map_or(0, |b| b.basis_size()),
            basis,
            coefficient_offset,
            sources: 0..0,
        }
    }

    /// Definition object carrying the same id and basis, without components.
    pub(crate) fn to_definition(&self) -> definition::Object {
        let mut object = definition::Object::new(self.id);
        object.set_basis(self.basis.clone());
        object
    }

    /// Check that the object can be rendered in every frame: an object without basis is
    /// a point source and needs a PSF everywhere.
    pub(crate) fn validate(&self, frames: &[Frame]) -> Result<(), MultifitError> {
        if self.basis.is_some() {
            return Ok(());
        }
        match frames.iter().find(|frame| frame.psf().is_none()) {
            Some(frame) => Err(MultifitError::MissingBasisOrPsf {
                object: self.id,
                frame: frame.id(),
            }),
            None => Ok(()),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn position(&self) -> Option<&GridComponent<Position>> {
        self.position.as_ref()
    }

    pub fn radius(&self) -> Option<&GridComponent<Radius>> {
        self.radius.as_ref()
    }

    pub fn ellipticity(&self) -> Option<&GridComponent<Ellipticity>> {
        self.ellipticity.as_ref()
    }

    pub fn component<K: ParameterKind>(&self) -> Option<&GridComponent<K>> {
        K::grid_slot(self)
    }

    pub fn basis(&self) -> Option<&Arc<dyn ModelBasis>> {
        self.basis.as_ref()
    }

    /// Start of this object's linear coefficients in the grid-wide coefficient vector.
    pub fn coefficient_offset(&self) -> usize {
        self.coefficient_offset
    }

    pub fn coefficient_count(&self) -> usize {
        self.coefficient_count
    }

    /// Indices of this object's sources in the grid's source array.
    pub fn source_range(&self) -> Range<usize> {
        self.sources.clone()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object {} = {{", self.id)?;
        if let Some(p) = &self.position {
            write!(f, "position {:?}, ", p.offset())?;
        }
        if let Some(r) = &self.radius {
            write!(f, "radius {:?}, ", r.offset())?;
        }
        if let Some(e) = &self.ellipticity {
            write!(f, "ellipticity {:?}, ", e.offset())?;
        }
        write!(
            f,
            "{} coefficients @ {}}}",
            self.coefficient_count, self.coefficient_offset
        )
    }
}
