#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use multifit::definition::{Definition, Frame, Object, ParameterComponent};
use multifit::parameters::{Ellipticity, Position, Radius};
use multifit::primitives::{AffineTransform, Footprint, LocalPsf, ModelBasis, Psf, Wcs};
use nalgebra::{Point2, Vector2};
use rand::rngs::StdRng;
use rand::Rng;

/// WCS whose sky → pixel mapping is a pure translation.
#[derive(Debug)]
pub struct ShiftWcs {
    pub dx: f64,
    pub dy: f64,
}

impl ShiftWcs {
    pub fn shared(dx: f64, dy: f64) -> Arc<dyn Wcs> {
        Arc::new(ShiftWcs { dx, dy })
    }
}

impl Wcs for ShiftWcs {
    fn linearize_sky_to_pixel(&self, _sky: &Point2<f64>) -> AffineTransform {
        AffineTransform::translation(self.dx, self.dy)
    }

    fn linearize_pixel_to_sky(&self, _sky: &Point2<f64>) -> AffineTransform {
        AffineTransform::translation(-self.dx, -self.dy)
    }
}

/// Local PSF keeping a count of live instances.
#[derive(Debug)]
pub struct CountedLocalPsf {
    position: Point2<f64>,
    live: Arc<AtomicUsize>,
}

impl LocalPsf for CountedLocalPsf {
    fn position(&self) -> Point2<f64> {
        self.position
    }
}

impl Drop for CountedLocalPsf {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct CountingPsf {
    pub live: Arc<AtomicUsize>,
}

impl CountingPsf {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Psf for CountingPsf {
    fn local_psf(&self, position: &Point2<f64>) -> Arc<dyn LocalPsf> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Arc::new(CountedLocalPsf {
            position: *position,
            live: Arc::clone(&self.live),
        })
    }
}

#[derive(Debug)]
pub struct FixedBasis {
    pub size: usize,
    pub convolved: bool,
}

impl FixedBasis {
    pub fn shared(size: usize) -> Arc<dyn ModelBasis> {
        Arc::new(FixedBasis {
            size,
            convolved: false,
        })
    }
}

impl ModelBasis for FixedBasis {
    fn basis_size(&self) -> usize {
        self.size
    }

    fn convolve(&self, _psf: &dyn LocalPsf) -> Arc<dyn ModelBasis> {
        Arc::new(FixedBasis {
            size: self.size,
            convolved: true,
        })
    }
}

pub fn box_footprint(width: i32, height: i32) -> Arc<Footprint> {
    Arc::new(Footprint::from_box(0, 0, width, height))
}

/// Random definition without WCS where every frame has a PSF.
///
/// Components are drawn from small pools so that several objects end up sharing them;
/// roughly one in four objects is a point source.
pub fn random_definition(rng: &mut StdRng, frame_count: usize, object_count: usize) -> Definition {
    let psf: Arc<dyn Psf> = Arc::new(CountingPsf::default());
    let mut def = Definition::new(None);

    // ids inserted in descending order to exercise sorting
    for i in (0..frame_count).rev() {
        let footprint = box_footprint(rng.random_range(1..8), rng.random_range(1..8));
        let frame = Frame::new(3 * i as i64 + 1, rng.random_range(0..3), footprint)
            .with_psf(Arc::clone(&psf));
        def.add_frame(frame);
    }

    let mut positions = Vec::new();
    let mut radii = Vec::new();
    let mut ellipticities = Vec::new();
    for i in (0..object_count).rev() {
        let position = pick_or_make(rng, &mut positions, |rng| {
            ParameterComponent::<Position>::make(
                Point2::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0)),
                rng.random_bool(0.8),
            )
        });
        let mut object = Object::new(5 * i as i64 + 2).with_position(position);
        if rng.random_bool(0.7) {
            object = object.with_radius(pick_or_make(rng, &mut radii, |rng| {
                ParameterComponent::<Radius>::make(rng.random_range(0.1..5.0), rng.random_bool(0.8))
            }));
        }
        if rng.random_bool(0.7) {
            object = object.with_ellipticity(pick_or_make(rng, &mut ellipticities, |rng| {
                ParameterComponent::<Ellipticity>::make(
                    Vector2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)),
                    rng.random_bool(0.8),
                )
            }));
        }
        if rng.random_bool(0.75) {
            object = object.with_basis(FixedBasis::shared(rng.random_range(1..6)));
        }
        def.add_object(object);
    }
    def
}

fn pick_or_make<T>(
    rng: &mut StdRng,
    pool: &mut Vec<Arc<T>>,
    make: impl FnOnce(&mut StdRng) -> Arc<T>,
) -> Arc<T> {
    if !pool.is_empty() && rng.random_bool(0.3) {
        let index = rng.random_range(0..pool.len());
        return Arc::clone(&pool[index]);
    }
    let component = make(rng);
    pool.push(Arc::clone(&component));
    component
}
