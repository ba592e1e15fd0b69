use std::sync::Arc;

use approx::assert_relative_eq;
use multifit::definition::Definition;
use multifit::grid::{find, Grid};
use multifit::multifit_errors::MultifitError;
use multifit::parameters::{Ellipticity, ParameterKind, Position, Radius};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod common;
use common::random_definition;

fn sample_definitions() -> Vec<Definition> {
    let mut rng = StdRng::seed_from_u64(0x5EED_0F_F175);
    let mut defs = vec![
        random_definition(&mut rng, 0, 0),
        random_definition(&mut rng, 1, 1),
        random_definition(&mut rng, 3, 0),
        random_definition(&mut rng, 0, 4),
    ];
    for _ in 0..20 {
        let frames = rng.random_range(1..6);
        let objects = rng.random_range(1..12);
        defs.push(random_definition(&mut rng, frames, objects));
    }
    defs
}

fn collect_ranges<K: ParameterKind>(grid: &Grid, ranges: &mut Vec<(usize, usize)>) {
    for component in grid.active_components::<K>() {
        let offset = component.offset().expect("active component without offset");
        ranges.push((offset, offset + K::SIZE));
    }
}

#[test]
fn active_offsets_tile_the_parameter_vector() {
    for def in sample_definitions() {
        let grid = Grid::new(&def).unwrap();
        let mut ranges = Vec::new();
        collect_ranges::<Position>(&grid, &mut ranges);
        collect_ranges::<Radius>(&grid, &mut ranges);
        collect_ranges::<Ellipticity>(&grid, &mut ranges);
        ranges.sort_unstable();

        let mut cursor = 0;
        for (start, end) in ranges {
            assert_eq!(start, cursor);
            cursor = end;
        }
        assert_eq!(cursor, grid.parameter_count());
    }
}

#[test]
fn shared_components_map_to_shared_grid_components() {
    for def in sample_definitions() {
        let grid = Grid::new(&def).unwrap();
        let def_objects: Vec<_> = def.objects().collect();
        for (i, a) in grid.objects().iter().enumerate() {
            for (j, b) in grid.objects().iter().enumerate() {
                if let (Some(da), Some(db)) = (def_objects[i].radius(), def_objects[j].radius()) {
                    assert_eq!(
                        Arc::ptr_eq(da, db),
                        Arc::ptr_eq(a.radius().unwrap(), b.radius().unwrap())
                    );
                }
                if let (Some(da), Some(db)) = (def_objects[i].position(), def_objects[j].position()) {
                    assert_eq!(
                        Arc::ptr_eq(da, db),
                        Arc::ptr_eq(a.position().unwrap(), b.position().unwrap())
                    );
                }
            }
        }
    }
}

#[test]
fn make_definition_preserves_sharing_and_values() {
    for def in sample_definitions() {
        let grid = Grid::new(&def).unwrap();
        let rebuilt = grid.make_definition();

        assert_eq!(rebuilt.frame_count(), def.frame_count());
        assert_eq!(rebuilt.object_count(), def.object_count());

        let before: Vec<_> = def.objects().collect();
        let after: Vec<_> = rebuilt.objects().collect();
        for i in 0..before.len() {
            assert_eq!(before[i].id(), after[i].id());
            match (before[i].ellipticity(), after[i].ellipticity()) {
                (Some(x), Some(y)) => {
                    assert_eq!(x.value(), y.value());
                    assert_eq!(x.is_active(), y.is_active());
                    // fresh instances
                    assert!(!Arc::ptr_eq(x, y));
                }
                (None, None) => {}
                _ => panic!("ellipticity presence changed for object {}", before[i].id()),
            }
            for j in 0..before.len() {
                if let (Some(x), Some(y)) = (before[i].ellipticity(), before[j].ellipticity()) {
                    let rebuilt_shared = Arc::ptr_eq(
                        after[i].ellipticity().unwrap(),
                        after[j].ellipticity().unwrap(),
                    );
                    assert_eq!(Arc::ptr_eq(x, y), rebuilt_shared);
                }
            }
        }

        let regrid = Grid::new(&rebuilt).unwrap();
        let mut p1 = vec![0.0; grid.parameter_count()];
        let mut p2 = vec![0.0; regrid.parameter_count()];
        grid.write_parameters(&mut p1).unwrap();
        regrid.write_parameters(&mut p2).unwrap();
        assert_eq!(p1, p2);
    }
}

#[test]
fn pixel_count_is_sum_of_footprint_areas() {
    for def in sample_definitions() {
        let grid = Grid::new(&def).unwrap();
        let total: usize = def.frames().map(|f| f.footprint().area()).sum();
        assert_eq!(grid.pixel_count(), total);

        let mut cursor = 0;
        for frame in grid.frames() {
            assert_eq!(frame.pixel_offset(), cursor);
            cursor += frame.pixel_count();
        }
        assert_eq!(cursor, total);
    }
}

#[test]
fn one_source_per_object_and_frame() {
    for def in sample_definitions() {
        let grid = Grid::new(&def).unwrap();
        assert_eq!(grid.sources().len(), grid.frames().len() * grid.objects().len());
        for (object_index, object) in grid.objects().iter().enumerate() {
            let sources = grid.sources_of(object);
            assert_eq!(sources.len(), grid.frames().len());
            for (frame_index, source) in sources.iter().enumerate() {
                assert_eq!(source.object_index(), object_index);
                assert_eq!(source.frame_index(), frame_index);
                assert_eq!(source.basis().is_some(), object.basis().is_some());
            }
        }
        let coefficients: usize = grid.objects().iter().map(|o| o.coefficient_count()).sum();
        assert_eq!(grid.coefficient_count(), coefficients);
    }
}

#[test]
fn find_returns_the_matching_entity() {
    for def in sample_definitions() {
        let grid = Grid::new(&def).unwrap();
        for frame in def.frames() {
            assert_eq!(grid.frame(frame.id()).unwrap().id(), frame.id());
        }
        for object in def.objects() {
            assert_eq!(find(grid.objects(), object.id()).unwrap().id(), object.id());
        }
        // generated ids are 1 mod 3 for frames and 2 mod 5 for objects
        assert_eq!(grid.frame(0).unwrap_err(), MultifitError::FrameNotFound(0));
        assert_eq!(grid.object(-1).unwrap_err(), MultifitError::ObjectNotFound(-1));
        assert!(grid.frame(i64::MAX).is_err());
    }
}

#[test]
fn clipping_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    for def in sample_definitions() {
        let grid = Grid::new(&def).unwrap();
        for _ in 0..10 {
            let mut params: Vec<f64> = (0..grid.parameter_count())
                .map(|_| rng.random_range(-30.0..30.0))
                .collect();
            let was_feasible = grid.check_bounds(&params).unwrap();
            let penalty = grid.clip_to_bounds(&mut params).unwrap();
            assert!(penalty >= 0.0);
            assert_eq!(was_feasible, penalty == 0.0);
            assert!(grid.check_bounds(&params).unwrap());

            let snapshot = params.clone();
            assert_relative_eq!(grid.clip_to_bounds(&mut params).unwrap(), 0.0);
            assert_eq!(params, snapshot);
        }
    }
}

#[test]
fn make_definition_with_reads_active_values_from_buffer() {
    let mut rng = StdRng::seed_from_u64(7);
    let def = random_definition(&mut rng, 2, 8);
    let grid = Grid::new(&def).unwrap();
    let params: Vec<f64> = (0..grid.parameter_count()).map(|i| i as f64 + 0.5).collect();
    let rebuilt = grid.make_definition_with(&params).unwrap();

    for (grid_object, object) in grid.objects().iter().zip(rebuilt.objects()) {
        let grid_radius = grid_object.radius();
        let radius = object.radius();
        match (grid_radius, radius) {
            (Some(g), Some(r)) => match g.offset() {
                Some(offset) => assert_relative_eq!(r.value(), params[offset]),
                None => assert_relative_eq!(r.value(), *g.value()),
            },
            (None, None) => {}
            _ => panic!("radius presence changed"),
        }
        if let (Some(g), Some(p)) = (grid_object.position(), object.position()) {
            if let Some(offset) = g.offset() {
                assert_relative_eq!(p.value().x, params[offset]);
                assert_relative_eq!(p.value().y, params[offset + 1]);
            }
        }
    }

    let regrid = Grid::new(&rebuilt).unwrap();
    let mut written = vec![0.0; regrid.parameter_count()];
    regrid.write_parameters(&mut written).unwrap();
    assert_eq!(written, params);
}
