//! Inverse transformation: [`Grid`] → fresh [`Definition`].

use crate::definition::{self, Definition};
use crate::identity_map::IdentityMap;
use crate::parameters::{Ellipticity, ParameterKind, Position, Radius};

use super::object::Object;
use super::Grid;

/// Build a new definition from `grid`.
///
/// Frames and objects are copied shallowly (footprints, PSFs, WCSs, weights and bases are
/// shared with the grid). Parameter components are recreated, one per distinct grid
/// component, so objects sharing a grid component share the new definition component.
/// When `params` is given, active components take their value from it; it must hold at
/// least `grid.parameter_count()` values.
pub(crate) fn make_definition(grid: &Grid, params: Option<&[f64]>) -> Definition {
    let mut result = Definition::new(grid.wcs().cloned());
    for frame in grid.frames() {
        result.add_frame(frame.to_definition());
    }

    let mut objects: Vec<definition::Object> =
        grid.objects().iter().map(Object::to_definition).collect();
    transfer_components::<Position>(grid.objects(), &mut objects, params);
    transfer_components::<Radius>(grid.objects(), &mut objects, params);
    transfer_components::<Ellipticity>(grid.objects(), &mut objects, params);

    for object in objects {
        result.add_object(object);
    }
    result
}

fn transfer_components<K: ParameterKind>(
    input: &[Object],
    output: &mut [definition::Object],
    params: Option<&[f64]>,
) {
    let mut unique: IdentityMap<definition::ParameterComponent<K>> = IdentityMap::new();
    for (grid_object, def_object) in input.iter().zip(output.iter_mut()) {
        let Some(grid_component) = K::grid_slot(grid_object) else {
            continue;
        };
        let (component, _) = unique.register_with(grid_component.key(), || {
            let value = match params {
                Some(params) => grid_component.read_value(params),
                None => *grid_component.value(),
            };
            definition::ParameterComponent::new(value, grid_component.is_active())
        });
        def_object.set_component::<K>(Some(component));
    }
}
