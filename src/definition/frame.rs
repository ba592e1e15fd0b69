use std::sync::Arc;

use nalgebra::DVector;

use crate::constants::{FilterId, Id, Pixel};
use crate::multifit_errors::MultifitError;
use crate::primitives::{Footprint, Psf, Wcs};

/// One observation in which the objects of a [`Definition`](super::Definition) are fitted.
///
/// Footprint, PSF, WCS and weights are shared by reference: cloning a frame, building a
/// grid from it, or reconstructing a definition from that grid never copies them.
#[derive(Debug, Clone)]
pub struct Frame {
    id: Id,
    filter_id: FilterId,
    footprint: Arc<Footprint>,
    psf: Option<Arc<dyn Psf>>,
    wcs: Option<Arc<dyn Wcs>>,
    weights: Option<Arc<DVector<Pixel>>>,
}

impl Frame {
    pub fn new(id: Id, filter_id: FilterId, footprint: Arc<Footprint>) -> Self {
        Frame {
            id,
            filter_id,
            footprint,
            psf: None,
            wcs: None,
            weights: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn with_psf(mut self, psf: Arc<dyn Psf>) -> Self {
        self.psf = Some(psf);
        self
    }

    pub fn with_wcs(mut self, wcs: Arc<dyn Wcs>) -> Self {
        self.wcs = Some(wcs);
        self
    }

    /// Attach per-pixel weights, one per footprint pixel in flattening order.
    ///
    /// Errors
    /// ----------
    /// * [`MultifitError::WeightsSizeMismatch`] if the length differs from the footprint area.
    pub fn with_weights(mut self, weights: Arc<DVector<Pixel>>) -> Result<Self, MultifitError> {
        let expected = self.footprint.area();
        if weights.len() != expected {
            return Err(MultifitError::WeightsSizeMismatch {
                frame: self.id,
                expected,
                found: weights.len(),
            });
        }
        self.weights = Some(weights);
        Ok(self)
    }

    /// Assemble a frame from already validated parts.
    pub(crate) fn from_parts(
        id: Id,
        filter_id: FilterId,
        footprint: Arc<Footprint>,
        psf: Option<Arc<dyn Psf>>,
        wcs: Option<Arc<dyn Wcs>>,
        weights: Option<Arc<DVector<Pixel>>>,
    ) -> Self {
        Frame {
            id,
            filter_id,
            footprint,
            psf,
            wcs,
            weights,
        }
    }

    pub fn filter_id(&self) -> FilterId {
        self.filter_id
    }

    pub fn footprint(&self) -> &Arc<Footprint> {
        &self.footprint
    }

    pub fn psf(&self) -> Option<&Arc<dyn Psf>> {
        self.psf.as_ref()
    }

    pub fn wcs(&self) -> Option<&Arc<dyn Wcs>> {
        self.wcs.as_ref()
    }

    pub fn weights(&self) -> Option<&Arc<DVector<Pixel>>> {
        self.weights.as_ref()
    }

    /// Turn per-pixel variances into inverse-sigma weights `1/sqrt(var)`.
    ///
    /// These weights are squared implicitly by the likelihood, which makes them the usual
    /// inverse-variance weighting. When `use_pixel_weights` is false, every weight is
    /// replaced by the geometric mean of all of them, which preserves the determinant of
    /// the diagonal pixel covariance.
    pub fn weights_from_variance(variance: &DVector<Pixel>, use_pixel_weights: bool) -> DVector<Pixel> {
        let mut weights = variance.map(|v| 1.0 / v.sqrt());
        if !use_pixel_weights && !weights.is_empty() {
            let mean_log = weights.iter().map(|w| w.ln()).sum::<f64>() / weights.len() as f64;
            weights.fill(mean_log.exp());
        }
        weights
    }
}

#[cfg(test)]
mod frame_test {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_weights_must_match_footprint() {
        let fp = Arc::new(Footprint::from_box(0, 0, 2, 2));
        let err = Frame::new(3, 0, Arc::clone(&fp))
            .with_weights(Arc::new(DVector::from_element(3, 1.0)))
            .unwrap_err();
        assert_eq!(
            err,
            MultifitError::WeightsSizeMismatch {
                frame: 3,
                expected: 4,
                found: 3
            }
        );

        let frame = Frame::new(3, 0, fp)
            .with_weights(Arc::new(DVector::from_element(4, 2.0)))
            .unwrap();
        assert_eq!(frame.weights().unwrap().len(), 4);
    }

    #[test]
    fn test_weights_from_variance() {
        let variance = DVector::from_vec(vec![4.0, 16.0]);

        let per_pixel = Frame::weights_from_variance(&variance, true);
        assert_relative_eq!(per_pixel[0], 0.5);
        assert_relative_eq!(per_pixel[1], 0.25);

        // geometric mean of 0.5 and 0.25
        let uniform = Frame::weights_from_variance(&variance, false);
        let expected = (0.5f64 * 0.25).sqrt();
        assert_relative_eq!(uniform[0], expected, epsilon = 1e-14);
        assert_relative_eq!(uniform[1], expected, epsilon = 1e-14);
    }
}
