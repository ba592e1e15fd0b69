//! # Parameter grid
//!
//! A [`Grid`] is the immutable, index-addressed materialization of a
//! [`Definition`](crate::definition::Definition) consumed by the fitter. It holds:
//!
//! - the [`Frame`]s, sorted by id, each placed at a `pixel_offset` in the flattened pixel
//!   vector and tagged with a dense filter index;
//! - the [`Object`]s, sorted by id, each with a `coefficient_offset` for its linear
//!   amplitudes and shared handles on its deduplicated [`ParameterComponent`]s;
//! - the [`Source`]s, one per (object, frame) pair, stored object-major so that an
//!   object's sources form a contiguous slice in frame order.
//!
//! ## Parameter vector layout
//!
//! Every distinct active component owns `K::SIZE` consecutive slots of the flat
//! parameter vector. Offsets are assigned kind by kind (position, radius, ellipticity)
//! and, within a kind, in object order, at the first object referencing the component.
//! The ranges `[offset, offset + K::SIZE)` therefore tile `[0, parameter_count)` exactly.
//!
//! ```text
//! | pos(obj 1) | pos(obj 2) | r(obj 1 & 2, shared) | e(obj 1) | e(obj 2) |
//! 0            2            4                      5          7          9
//! ```
//!
//! ## Construction and teardown
//!
//! [`Grid::new`] either returns a complete grid or an error; entity storage is sized
//! up front and, on failure, exactly the elements already built are destroyed (sources,
//! then objects, then frames) before the error is returned. The same order applies when
//! a grid is dropped.
//!
//! ## Concurrency
//!
//! A grid is never mutated after construction and is `Send + Sync`; any number of
//! threads may read it concurrently.
//!
//! ## See also
//! ------------
//! * [`Grid::make_definition`] – Rebuild a mutable definition from a grid.
//! * [`GridParams`] – Feasible domains used by [`Grid::check_bounds`] and [`Grid::clip_to_bounds`].

mod arena;
mod builder;
pub mod frame;
pub mod object;
pub mod parameter_component;
mod reconstruct;
pub mod source;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ahash::RandomState;
use itertools::Itertools;

use crate::constants::{FilterId, Id};
use crate::definition::Definition;
use crate::multifit_errors::MultifitError;
use crate::parameters::{
    Ellipticity, GridComponent, GridParams, ParameterKind, Position, Radius,
};
use crate::primitives::Wcs;

pub use frame::Frame;
pub use object::Object;
pub use parameter_component::ParameterComponent;
pub use source::Source;

/// Active grid components of each kind, in offset order.
#[derive(Debug, Default)]
pub struct ActiveComponents {
    pub(crate) positions: Vec<GridComponent<Position>>,
    pub(crate) radii: Vec<GridComponent<Radius>>,
    pub(crate) ellipticities: Vec<GridComponent<Ellipticity>>,
}

/// Entities that can be looked up by id with [`find`].
pub trait Identified {
    fn id(&self) -> Id;

    fn not_found(id: Id) -> MultifitError;
}

impl Identified for Frame {
    fn id(&self) -> Id {
        Frame::id(self)
    }

    fn not_found(id: Id) -> MultifitError {
        MultifitError::FrameNotFound(id)
    }
}

impl Identified for Object {
    fn id(&self) -> Id {
        Object::id(self)
    }

    fn not_found(id: Id) -> MultifitError {
        MultifitError::ObjectNotFound(id)
    }
}

/// Binary search for `id` in an array sorted by ascending id.
///
/// Errors
/// ----------
/// * [`MultifitError::FrameNotFound`] / [`MultifitError::ObjectNotFound`] if absent.
pub fn find<T: Identified>(array: &[T], id: Id) -> Result<&T, MultifitError> {
    array
        .binary_search_by_key(&id, Identified::id)
        .map(|index| &array[index])
        .map_err(|_| T::not_found(id))
}

#[derive(Debug)]
pub struct Grid {
    // declaration order is drop order: sources, objects, frames
    sources: Box<[Source]>,
    objects: Box<[Object]>,
    frames: Box<[Frame]>,
    active: ActiveComponents,
    filters: HashMap<FilterId, usize, RandomState>,
    filter_count: usize,
    coefficient_count: usize,
    pixel_count: usize,
    parameter_count: usize,
    wcs: Option<Arc<dyn Wcs>>,
    params: GridParams,
}

impl Grid {
    /// Build a grid from `definition` with the default [`GridParams`].
    ///
    /// Errors
    /// ----------
    /// * [`MultifitError::MissingBasisOrPsf`] – an object without basis in a frame without PSF.
    /// * [`MultifitError::InconsistentCoordinateSystem`] – WCS set on some of the frames and
    ///   the definition but not all.
    /// * [`MultifitError::MissingPosition`] – an object without position where one is needed.
    pub fn new(definition: &Definition) -> Result<Self, MultifitError> {
        Self::with_params(definition, GridParams::default())
    }

    pub fn with_params(definition: &Definition, params: GridParams) -> Result<Self, MultifitError> {
        builder::build_grid(definition, params)
    }

    /// Frames in ascending id order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Objects in ascending id order.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// All sources, object-major.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// The sources of `object`, one per frame in frame order.
    pub fn sources_of(&self, object: &Object) -> &[Source] {
        &self.sources[object.source_range()]
    }

    pub fn source(&self, object_index: usize, frame_index: usize) -> Option<&Source> {
        if object_index >= self.objects.len() || frame_index >= self.frames.len() {
            return None;
        }
        self.sources.get(object_index * self.frames.len() + frame_index)
    }

    pub fn frame(&self, id: Id) -> Result<&Frame, MultifitError> {
        find(&self.frames, id)
    }

    pub fn object(&self, id: Id) -> Result<&Object, MultifitError> {
        find(&self.objects, id)
    }

    /// Frame a source belongs to.
    pub fn frame_of(&self, source: &Source) -> &Frame {
        &self.frames[source.frame_index()]
    }

    /// Object a source belongs to.
    pub fn object_of(&self, source: &Source) -> &Object {
        &self.objects[source.object_index()]
    }

    /// Dense index of `filter_id`.
    pub fn filter_index(&self, filter_id: FilterId) -> Result<usize, MultifitError> {
        self.filters
            .get(&filter_id)
            .copied()
            .ok_or(MultifitError::FilterNotFound(filter_id))
    }

    pub fn filter_count(&self) -> usize {
        self.filter_count
    }

    pub fn coefficient_count(&self) -> usize {
        self.coefficient_count
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Number of free nonlinear parameters.
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub fn wcs(&self) -> Option<&Arc<dyn Wcs>> {
        self.wcs.as_ref()
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn positions(&self) -> &[GridComponent<Position>] {
        &self.active.positions
    }

    pub fn radii(&self) -> &[GridComponent<Radius>] {
        &self.active.radii
    }

    pub fn ellipticities(&self) -> &[GridComponent<Ellipticity>] {
        &self.active.ellipticities
    }

    /// Active components of kind `K`, in offset order.
    pub fn active_components<K: ParameterKind>(&self) -> &[GridComponent<K>] {
        K::active_components(&self.active)
    }

    fn check_buffer(&self, len: usize) -> Result<(), MultifitError> {
        if len != self.parameter_count {
            return Err(MultifitError::ParameterBufferSize {
                expected: self.parameter_count,
                found: len,
            });
        }
        Ok(())
    }

    /// Write the value of every active component at its offset in `params`.
    pub fn write_parameters(&self, params: &mut [f64]) -> Result<(), MultifitError> {
        self.check_buffer(params.len())?;
        self.active.positions.iter().for_each(|c| c.write_parameters(params));
        self.active.radii.iter().for_each(|c| c.write_parameters(params));
        self.active.ellipticities.iter().for_each(|c| c.write_parameters(params));
        Ok(())
    }

    /// True iff every active component's slice of `params` lies in its feasible domain.
    pub fn check_bounds(&self, params: &[f64]) -> Result<bool, MultifitError> {
        self.check_buffer(params.len())?;
        let bounds = &self.params;
        Ok(self.active.positions.iter().all(|c| c.check_bounds(params, bounds))
            && self.active.radii.iter().all(|c| c.check_bounds(params, bounds))
            && self
                .active
                .ellipticities
                .iter()
                .all(|c| c.check_bounds(params, bounds)))
    }

    /// Project every active component's slice of `params` onto its feasible domain, in
    /// place.
    ///
    /// Return
    /// ----------
    /// * The summed projection distances over all components; zero iff `params` was
    ///   already feasible.
    pub fn clip_to_bounds(&self, params: &mut [f64]) -> Result<f64, MultifitError> {
        self.check_buffer(params.len())?;
        let bounds = &self.params;
        let mut penalty = 0.0;
        for c in self.active.positions.iter() {
            penalty += c.clip_to_bounds(params, bounds);
        }
        for c in self.active.radii.iter() {
            penalty += c.clip_to_bounds(params, bounds);
        }
        for c in self.active.ellipticities.iter() {
            penalty += c.clip_to_bounds(params, bounds);
        }
        Ok(penalty)
    }

    /// Σ over frames of Σ over pixels of `ln(weight)`, the normalization term of the
    /// Gaussian likelihood.
    pub fn sum_log_weights(&self) -> f64 {
        self.frames.iter().map(Frame::sum_log_weights).sum()
    }

    /// A new mutable definition equivalent to the one this grid was built from, with the
    /// same sharing of parameter components.
    pub fn make_definition(&self) -> Definition {
        reconstruct::make_definition(self, None)
    }

    /// Like [`Grid::make_definition`], with active component values read from `params`.
    pub fn make_definition_with(&self, params: &[f64]) -> Result<Definition, MultifitError> {
        self.check_buffer(params.len())?;
        Ok(reconstruct::make_definition(self, Some(params)))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Grid: {} parameters, {} coefficients, {} pixels, {} filters",
            self.parameter_count, self.coefficient_count, self.pixel_count, self.filter_count
        )?;
        writeln!(f, "{}", self.frames.iter().join("\n"))?;
        write!(f, "{}", self.objects.iter().join("\n"))
    }
}
