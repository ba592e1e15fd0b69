//! Forward transformation: [`Definition`] → [`Grid`].
//!
//! Construction runs in a fixed order over a pre-sized [`GridArena`]:
//!
//! 1. frames, assigning pixel offsets, dense filter indices and frame indices;
//! 2. objects, assigning coefficient offsets;
//! 3. parameter components, one kind at a time (position, radius, ellipticity), each
//!    deduplicated by identity and, if active, given the next parameter offset;
//! 4. validation of every object against the frames;
//! 5. sources, object-major, one per frame.
//!
//! Any error in these steps unwinds the arena before it is returned, so a partially
//! built grid is never observable.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use log::{debug, trace};

use crate::constants::FilterId;
use crate::definition::{self, Definition};
use crate::identity_map::IdentityMap;
use crate::multifit_errors::MultifitError;
use crate::parameters::{Ellipticity, GridParams, ParameterKind, Position, Radius};

use super::arena::GridArena;
use super::frame::Frame;
use super::object::Object;
use super::parameter_component::ParameterComponent;
use super::source::Source;
use super::{ActiveComponents, Grid};

/// Running totals accumulated while the arena is filled.
#[derive(Debug, Default)]
struct Totals {
    filters: HashMap<FilterId, usize, RandomState>,
    coefficient_count: usize,
    pixel_count: usize,
    parameter_count: usize,
    active: ActiveComponents,
}

pub(crate) fn build_grid(definition: &Definition, params: GridParams) -> Result<Grid, MultifitError> {
    let mut arena = GridArena::allocate(definition.frame_count(), definition.object_count());
    let mut totals = Totals::default();

    if let Err(err) = populate(definition, &mut arena, &mut totals) {
        arena.unwind();
        return Err(err);
    }
    debug_assert!(arena.is_complete());

    let GridArena {
        sources,
        objects,
        frames,
    } = arena;
    let grid = Grid {
        sources: sources.into_boxed_slice(),
        objects: objects.into_boxed_slice(),
        frames: frames.into_boxed_slice(),
        active: totals.active,
        filter_count: totals.filters.len(),
        filters: totals.filters,
        coefficient_count: totals.coefficient_count,
        pixel_count: totals.pixel_count,
        parameter_count: totals.parameter_count,
        wcs: definition.wcs().cloned(),
        params,
    };

    debug!(
        "built grid: {} frames, {} objects, {} sources, {} parameters, {} coefficients, {} pixels, {} filters",
        grid.frames.len(),
        grid.objects.len(),
        grid.sources.len(),
        grid.parameter_count,
        grid.coefficient_count,
        grid.pixel_count,
        grid.filter_count,
    );
    Ok(grid)
}

fn populate(
    definition: &Definition,
    arena: &mut GridArena,
    totals: &mut Totals,
) -> Result<(), MultifitError> {
    let GridArena {
        sources,
        objects,
        frames,
    } = arena;

    for (frame_index, def_frame) in definition.frames().enumerate() {
        let next_filter = totals.filters.len();
        let filter_index = *totals
            .filters
            .entry(def_frame.filter_id())
            .or_insert(next_filter);
        frames.construct(Frame::from_definition(
            def_frame,
            totals.pixel_count,
            filter_index,
            frame_index,
        ));
        totals.pixel_count += def_frame.footprint().area();
    }

    for def_object in definition.objects() {
        let object = Object::from_definition(def_object, totals.coefficient_count);
        totals.coefficient_count += object.coefficient_count();
        objects.construct(object);
    }

    transfer_components::<Position>(definition, objects.as_mut_slice(), totals);
    transfer_components::<Radius>(definition, objects.as_mut_slice(), totals);
    transfer_components::<Ellipticity>(definition, objects.as_mut_slice(), totals);

    let frames = frames.as_slice();
    for object in objects.as_slice() {
        object.validate(frames)?;
    }

    let wcs = definition.wcs();
    for (object_index, object) in objects.as_mut_slice().iter_mut().enumerate() {
        let start = sources.constructed();
        for frame in frames {
            sources.construct(Source::new(frame, object, object_index, wcs)?);
        }
        object.sources = start..sources.constructed();
    }

    Ok(())
}

/// Attach the deduplicated grid component of kind `K` to every grid object, assigning
/// parameter offsets to newly seen active components.
fn transfer_components<K: ParameterKind>(
    definition: &Definition,
    objects: &mut [Object],
    totals: &mut Totals,
) {
    let mut unique: IdentityMap<ParameterComponent<K>> = IdentityMap::new();
    let parameter_count = &mut totals.parameter_count;
    let active = K::active_components_mut(&mut totals.active);

    for (def_object, object) in definition.objects().zip(objects.iter_mut()) {
        let Some(def_component) = K::definition_slot(def_object) else {
            continue;
        };
        let (component, is_new) = unique.register_with(def_component.key(), || {
            make_grid_component(def_component, parameter_count)
        });
        if is_new {
            if let Some(offset) = component.offset() {
                trace!(
                    "object {}: {} parameters at offset {}",
                    object.id(),
                    K::NAME,
                    offset
                );
                active.push(Arc::clone(&component));
            }
        }
        *K::grid_slot_mut(object) = Some(component);
    }

    trace!("{} distinct {} components", unique.len(), K::NAME);
}

fn make_grid_component<K: ParameterKind>(
    def_component: &definition::ParameterComponent<K>,
    parameter_count: &mut usize,
) -> ParameterComponent<K> {
    let (value, active) = def_component.snapshot();
    let offset = active.then(|| {
        let offset = *parameter_count;
        *parameter_count += K::SIZE;
        offset
    });
    ParameterComponent::new(value, offset)
}
