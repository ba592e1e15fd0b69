//! # Geometry, PSF and basis primitives
//!
//! The grid treats coordinate systems, point-spread functions and model bases as
//! **opaque services**. This module defines the seams through which they are consumed:
//!
//! - [`Wcs`] – world coordinate system, only ever used through its local linearizations.
//! - [`Psf`] / [`LocalPsf`] – a spatially varying PSF and its evaluation at one position.
//! - [`ModelBasis`] – a set of basis functions for the linear amplitudes of one object,
//!   which can be convolved with a [`LocalPsf`].
//!
//! It also provides the two concrete value types the grid needs directly:
//! [`AffineTransform`] and [`Footprint`].
//!
//! All service traits require `Send + Sync`, so a built [`Grid`](crate::grid::Grid)
//! holding them can be shared between threads.

pub mod affine;
pub mod footprint;

use std::fmt::Debug;
use std::sync::Arc;

use nalgebra::Point2;

pub use affine::AffineTransform;
pub use footprint::{Footprint, Span};

/// World coordinate system of a frame or of the fit itself.
pub trait Wcs: Debug + Send + Sync {
    /// Local affine approximation of the sky → pixel mapping around `sky`.
    fn linearize_sky_to_pixel(&self, sky: &Point2<f64>) -> AffineTransform;

    /// Local affine approximation of the pixel → sky mapping around the pixel position that
    /// corresponds to `sky`.
    fn linearize_pixel_to_sky(&self, sky: &Point2<f64>) -> AffineTransform;
}

/// A PSF evaluated at one position of a frame.
pub trait LocalPsf: Debug + Send + Sync {
    /// Position (in frame pixels) at which this PSF was localized.
    fn position(&self) -> Point2<f64>;
}

/// Spatially varying point-spread function of a frame.
pub trait Psf: Debug + Send + Sync {
    fn local_psf(&self, position: &Point2<f64>) -> Arc<dyn LocalPsf>;
}

/// Basis functions spanning the linear amplitudes of an object.
pub trait ModelBasis: Debug + Send + Sync {
    /// Number of basis functions, i.e. linear coefficients contributed by the object.
    fn basis_size(&self) -> usize;

    /// The basis convolved with `psf`.
    fn convolve(&self, psf: &dyn LocalPsf) -> Arc<dyn ModelBasis>;
}
