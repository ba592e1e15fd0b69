use std::ops::Mul;

use nalgebra::{Matrix2, Point2, Vector2};

/// A 2-D affine map `p ↦ L·p + t`.
///
/// Used for the linearized sky ↔ pixel mappings returned by a [`Wcs`](crate::primitives::Wcs)
/// and for the per-source transform composed by the grid builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub linear: Matrix2<f64>,
    pub translation: Vector2<f64>,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub fn new(linear: Matrix2<f64>, translation: Vector2<f64>) -> Self {
        AffineTransform {
            linear,
            translation,
        }
    }

    pub fn identity() -> Self {
        AffineTransform {
            linear: Matrix2::identity(),
            translation: Vector2::zeros(),
        }
    }

    /// Pure translation by `(dx, dy)`.
    pub fn translation(dx: f64, dy: f64) -> Self {
        AffineTransform {
            linear: Matrix2::identity(),
            translation: Vector2::new(dx, dy),
        }
    }

    pub fn apply(&self, point: &Point2<f64>) -> Point2<f64> {
        Point2::from(self.linear * point.coords + self.translation)
    }
}

/// Composition: `(a * b).apply(p) == a.apply(&b.apply(p))`.
impl Mul for AffineTransform {
    type Output = AffineTransform;

    fn mul(self, rhs: AffineTransform) -> AffineTransform {
        AffineTransform {
            linear: self.linear * rhs.linear,
            translation: self.linear * rhs.translation + self.translation,
        }
    }
}
