//! Parameter bookkeeping for simultaneous multi-frame model fitting.
//!
//! A mutable [`definition::Definition`] describes what is being fit: frames (images with
//! a footprint, PSF, WCS and weights) and objects (parameter components and a model
//! basis). A [`grid::Grid`] is its frozen, index-addressed form, with every active
//! parameter given an offset in a flat vector and one [`grid::Source`] per object and
//! frame.

pub mod constants;
pub mod definition;
pub mod grid;
mod identity_map;
pub mod multifit_errors;
pub mod parameters;
pub mod primitives;
pub mod registry;
