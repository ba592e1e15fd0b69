use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ELLIPTICITY, MIN_RADIUS};
use crate::multifit_errors::MultifitError;

/// Feasible-domain settings used by the bounds utilities of a [`Grid`](crate::grid::Grid).
///
/// Only the radius and ellipticity kinds are bounded; positions are always feasible.
///
/// # Example
///
/// ```rust
/// use multifit::parameters::GridParams;
///
/// let params = GridParams::builder()
///     .max_ellipticity(4.0)
///     .min_radius(0.5)
///     .build()
///     .unwrap();
/// assert_eq!(params.max_ellipticity, 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// Largest accepted conformal-shear magnitude `|η|`.
    pub max_ellipticity: f64,
    /// Smallest accepted radius.
    pub min_radius: f64,
}

impl GridParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> GridParamsBuilder {
        GridParamsBuilder::new()
    }
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            max_ellipticity: MAX_ELLIPTICITY,
            min_radius: MIN_RADIUS,
        }
    }
}

/// Builder for [`GridParams`], with validation.
#[derive(Debug, Clone)]
pub struct GridParamsBuilder {
    params: GridParams,
}

impl Default for GridParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GridParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: GridParams::default(),
        }
    }

    pub fn max_ellipticity(mut self, v: f64) -> Self {
        self.params.max_ellipticity = v;
        self
    }

    pub fn min_radius(mut self, v: f64) -> Self {
        self.params.min_radius = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    pub fn build(self) -> Result<GridParams, MultifitError> {
        let p = &self.params;

        if !Self::gt0(p.max_ellipticity) || !p.max_ellipticity.is_finite() {
            return Err(MultifitError::InvalidGridParams(
                "max_ellipticity must be finite and > 0".into(),
            ));
        }
        if !Self::ge0(p.min_radius) || !p.min_radius.is_finite() {
            return Err(MultifitError::InvalidGridParams(
                "min_radius must be finite and >= 0".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for GridParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GridParams {{ max_ellipticity = {}, min_radius = {} }}",
            self.max_ellipticity, self.min_radius
        )
    }
}
