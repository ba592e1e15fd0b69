//! # Nonlinear parameter components
//!
//! A model object is described by up to three **parameter components**, one per
//! [`ParameterKind`]:
//!
//! | Kind            | SIZE | Value                          | Feasible domain                  |
//! |-----------------|------|--------------------------------|----------------------------------|
//! | [`Position`]    | 2    | `Point2<f64>` (x, y)           | unbounded                        |
//! | [`Radius`]      | 1    | `f64`                          | `r >= min_radius`                |
//! | [`Ellipticity`] | 2    | `Vector2<f64>` (η1, η2)        | `|η| <= max_ellipticity`         |
//!
//! Each component carries an `active` flag: active components are free in the fit and
//! occupy `SIZE` consecutive slots of the flat parameter vector of a
//! [`Grid`](crate::grid::Grid); inactive ones are held fixed.
//!
//! Components are shared between objects **by identity**, not by value. Every component
//! instance receives a unique [`ComponentKey`] when it is created, and the grid builder
//! deduplicates on that key, so two objects that hold the same instance end up sharing a
//! single grid component (and a single offset).
//!
//! The kinds are zero-sized marker types. Besides the value codec and the bounds logic,
//! [`ParameterKind`] exposes the storage slot of its kind on definition and grid objects,
//! which lets the builder and the reconstructor walk all three kinds with the same
//! generic code.

pub mod grid_params;

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nalgebra::{Point2, Vector2};

use crate::definition;
use crate::grid;

pub use grid_params::{GridParams, GridParamsBuilder};

/// Identity tag of a parameter component instance.
///
/// Keys are drawn from a process-wide counter and never reused, so two components compare
/// equal by key iff they are the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey(u64);

static NEXT_COMPONENT_KEY: AtomicU64 = AtomicU64::new(0);

impl ComponentKey {
    pub(crate) fn next() -> Self {
        ComponentKey(NEXT_COMPONENT_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Shared handle on a definition-side component.
pub type SharedComponent<K> = Arc<definition::ParameterComponent<K>>;

/// Shared handle on a grid-side component.
pub type GridComponent<K> = Arc<grid::ParameterComponent<K>>;

/// Compile-time description of one kind of nonlinear parameter.
pub trait ParameterKind: Debug + Send + Sync + Sized + 'static {
    /// Number of scalars occupied in the flat parameter vector.
    const SIZE: usize;
    const NAME: &'static str;

    type Value: Copy + Debug + PartialEq + Send + Sync;

    /// Decode a value from `params[..Self::SIZE]`.
    fn read_parameters(params: &[f64]) -> Self::Value;

    /// Encode `value` into `params[..Self::SIZE]`.
    fn write_parameters(value: &Self::Value, params: &mut [f64]);

    fn check_bounds(params: &[f64], bounds: &GridParams) -> bool;

    /// Project `params[..Self::SIZE]` onto the feasible domain and return the distance moved.
    ///
    /// Infeasible values always move and always give a positive penalty, NaN and infinite
    /// inputs included; an undefined or infinite distance is charged as `f64::MAX`.
    fn clip_to_bounds(params: &mut [f64], bounds: &GridParams) -> f64;

    fn definition_slot(object: &definition::Object) -> Option<&SharedComponent<Self>>;

    fn definition_slot_mut(object: &mut definition::Object) -> &mut Option<SharedComponent<Self>>;

    fn grid_slot(object: &grid::Object) -> Option<&GridComponent<Self>>;

    fn grid_slot_mut(object: &mut grid::Object) -> &mut Option<GridComponent<Self>>;

    /// Active grid components of this kind, in offset order.
    fn active_components(active: &grid::ActiveComponents) -> &[GridComponent<Self>];

    fn active_components_mut(active: &mut grid::ActiveComponents) -> &mut Vec<GridComponent<Self>>;
}

/// Penalty for a projection that moved a value by `distance`.
fn projection_penalty(distance: f64) -> f64 {
    if distance.is_finite() {
        distance
    } else {
        f64::MAX
    }
}

/// Sign of an infinite component, 0 for a finite one.
fn infinite_direction(v: f64) -> f64 {
    if v.is_infinite() {
        v.signum()
    } else {
        0.0
    }
}

/// Center of an object, in the coordinates of the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position;

/// Size of an object (trace radius).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Radius;

/// Shape of an object, as a conformal shear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ellipticity;

impl ParameterKind for Position {
    const SIZE: usize = 2;
    const NAME: &'static str = "position";

    type Value = Point2<f64>;

    fn read_parameters(params: &[f64]) -> Point2<f64> {
        Point2::new(params[0], params[1])
    }

    fn write_parameters(value: &Point2<f64>, params: &mut [f64]) {
        params[0] = value.x;
        params[1] = value.y;
    }

    fn check_bounds(_params: &[f64], _bounds: &GridParams) -> bool {
        true
    }

    fn clip_to_bounds(_params: &mut [f64], _bounds: &GridParams) -> f64 {
        0.0
    }

    fn definition_slot(object: &definition::Object) -> Option<&SharedComponent<Self>> {
        object.position.as_ref()
    }

    fn definition_slot_mut(object: &mut definition::Object) -> &mut Option<SharedComponent<Self>> {
        &mut object.position
    }

    fn grid_slot(object: &grid::Object) -> Option<&GridComponent<Self>> {
        object.position.as_ref()
    }

    fn grid_slot_mut(object: &mut grid::Object) -> &mut Option<GridComponent<Self>> {
        &mut object.position
    }

    fn active_components(active: &grid::ActiveComponents) -> &[GridComponent<Self>] {
        &active.positions
    }

    fn active_components_mut(active: &mut grid::ActiveComponents) -> &mut Vec<GridComponent<Self>> {
        &mut active.positions
    }
}

impl ParameterKind for Radius {
    const SIZE: usize = 1;
    const NAME: &'static str = "radius";

    type Value = f64;

    fn read_parameters(params: &[f64]) -> f64 {
        params[0]
    }

    fn write_parameters(value: &f64, params: &mut [f64]) {
        params[0] = *value;
    }

    fn check_bounds(params: &[f64], bounds: &GridParams) -> bool {
        params[0] >= bounds.min_radius
    }

    fn clip_to_bounds(params: &mut [f64], bounds: &GridParams) -> f64 {
        if params[0] >= bounds.min_radius {
            return 0.0;
        }
        // NaN lands here too
        let penalty = projection_penalty(bounds.min_radius - params[0]);
        params[0] = bounds.min_radius;
        penalty
    }

    fn definition_slot(object: &definition::Object) -> Option<&SharedComponent<Self>> {
        object.radius.as_ref()
    }

    fn definition_slot_mut(object: &mut definition::Object) -> &mut Option<SharedComponent<Self>> {
        &mut object.radius
    }

    fn grid_slot(object: &grid::Object) -> Option<&GridComponent<Self>> {
        object.radius.as_ref()
    }

    fn grid_slot_mut(object: &mut grid::Object) -> &mut Option<GridComponent<Self>> {
        &mut object.radius
    }

    fn active_components(active: &grid::ActiveComponents) -> &[GridComponent<Self>] {
        &active.radii
    }

    fn active_components_mut(active: &mut grid::ActiveComponents) -> &mut Vec<GridComponent<Self>> {
        &mut active.radii
    }
}

impl ParameterKind for Ellipticity {
    const SIZE: usize = 2;
    const NAME: &'static str = "ellipticity";

    type Value = Vector2<f64>;

    fn read_parameters(params: &[f64]) -> Vector2<f64> {
        Vector2::new(params[0], params[1])
    }

    fn write_parameters(value: &Vector2<f64>, params: &mut [f64]) {
        params[0] = value.x;
        params[1] = value.y;
    }

    fn check_bounds(params: &[f64], bounds: &GridParams) -> bool {
        params[0].hypot(params[1]) <= bounds.max_ellipticity
    }

    fn clip_to_bounds(params: &mut [f64], bounds: &GridParams) -> f64 {
        let magnitude = params[0].hypot(params[1]);
        if magnitude <= bounds.max_ellipticity {
            return 0.0;
        }
        if params[0].is_nan() || params[1].is_nan() {
            params[0] = 0.0;
            params[1] = 0.0;
            return f64::MAX;
        }
        if magnitude.is_infinite() {
            // keep the direction only, so that the rescale below stays finite
            let (a, b) = if params[0].is_infinite() || params[1].is_infinite() {
                (infinite_direction(params[0]), infinite_direction(params[1]))
            } else {
                let largest = params[0].abs().max(params[1].abs());
                (params[0] / largest, params[1] / largest)
            };
            params[0] = a;
            params[1] = b;
        }
        let scale = bounds.max_ellipticity / params[0].hypot(params[1]);
        params[0] *= scale;
        params[1] *= scale;
        // rounding may leave the rescaled value one ulp outside the domain
        while params[0].hypot(params[1]) > bounds.max_ellipticity {
            params[0] *= 1.0 - f64::EPSILON;
            params[1] *= 1.0 - f64::EPSILON;
        }
        projection_penalty(magnitude - bounds.max_ellipticity)
    }

    fn definition_slot(object: &definition::Object) -> Option<&SharedComponent<Self>> {
        object.ellipticity.as_ref()
    }

    fn definition_slot_mut(object: &mut definition::Object) -> &mut Option<SharedComponent<Self>> {
        &mut object.ellipticity
    }

    fn grid_slot(object: &grid::Object) -> Option<&GridComponent<Self>> {
        object.ellipticity.as_ref()
    }

    fn grid_slot_mut(object: &mut grid::Object) -> &mut Option<GridComponent<Self>> {
        &mut object.ellipticity
    }

    fn active_components(active: &grid::ActiveComponents) -> &[GridComponent<Self>] {
        &active.ellipticities
    }

    fn active_components_mut(active: &mut grid::ActiveComponents) -> &mut Vec<GridComponent<Self>> {
        &mut active.ellipticities
    }
}
