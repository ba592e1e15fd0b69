//! # Constants and type definitions for multifit
//!
//! This module centralizes the **numerical defaults** and **common type aliases** used
//! throughout the crate: identifiers for objects, frames and filters, the pixel scalar,
//! and the default feasible-domain limits applied by the bounds utilities of the
//! [`Grid`](crate::grid::Grid).

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Identifier of an object or a frame, assigned by the caller.
///
/// Objects and frames are kept sorted by this identifier, so it must be unique
/// within each collection.
pub type Id = i64;

/// Opaque identifier of a photometric filter.
pub type FilterId = i32;

/// Scalar type of pixel data, weights and parameters.
pub type Pixel = f64;

// -------------------------------------------------------------------------------------------------
// Bounds defaults
// -------------------------------------------------------------------------------------------------

/// Largest conformal-shear magnitude accepted for an ellipticity component.
///
/// Beyond this value the implied axis ratio `exp(-|η|)` underflows any useful precision.
pub const MAX_ELLIPTICITY: f64 = 9.9;

/// Smallest radius accepted for a radius component.
pub const MIN_RADIUS: f64 = 0.0;
