use std::sync::Arc;

use nalgebra::Point2;

use crate::multifit_errors::MultifitError;
use crate::primitives::{AffineTransform, LocalPsf, ModelBasis, Wcs};

use super::frame::Frame;
use super::object::Object;

/// One object as seen in one frame.
#[derive(Debug)]
pub struct Source {
    frame_index: usize,
    object_index: usize,
    transform: AffineTransform,
    local_psf: Option<Arc<dyn LocalPsf>>,
    basis: Option<Arc<dyn ModelBasis>>,
}

impl Source {
    /// Pair `object` with `frame`.
    ///
    /// The transform maps the object's position (in the coordinates of the fit) to frame
    /// pixels. It is the identity when no WCS is involved; otherwise it is the frame's
    /// sky → pixel linearization composed with the definition's pixel → sky linearization,
    /// both taken at the object position.
    ///
    /// Errors
    /// ----------
    /// * [`MultifitError::InconsistentCoordinateSystem`] if exactly one of `wcs` and the
    ///   frame WCS is set.
    /// * [`MultifitError::MissingPosition`] if a transform or a local PSF is needed and the
    ///   object has no position.
    /// * [`MultifitError::MissingBasisOrPsf`] if neither the object basis nor the frame PSF
    ///   exists.
    pub(crate) fn new(
        frame: &Frame,
        object: &Object,
        object_index: usize,
        wcs: Option<&Arc<dyn Wcs>>,
    ) -> Result<Self, MultifitError> {
        let transform = match (wcs, frame.wcs()) {
            (Some(fit_wcs), Some(frame_wcs)) => {
                let point = object_position(object)?;
                frame_wcs.linearize_sky_to_pixel(&point) * fit_wcs.linearize_pixel_to_sky(&point)
            }
            (None, None) => AffineTransform::identity(),
            (Some(_), None) => {
                return Err(MultifitError::InconsistentCoordinateSystem(format!(
                    "the definition WCS is set but frame {} has none",
                    frame.id()
                )))
            }
            (None, Some(_)) => {
                return Err(MultifitError::InconsistentCoordinateSystem(format!(
                    "frame {} has a WCS but the definition has none",
                    frame.id()
                )))
            }
        };

        let local_psf = match frame.psf() {
            Some(psf) => {
                let point = object_position(object)?;
                Some(psf.local_psf(&transform.apply(&point)))
            }
            None => None,
        };

        let basis = match (object.basis(), &local_psf) {
            (Some(basis), Some(psf)) => Some(basis.convolve(&**psf)),
            (Some(basis), None) => Some(Arc::clone(basis)),
            (None, Some(_)) => None,
            (None, None) => {
                return Err(MultifitError::MissingBasisOrPsf {
                    object: object.id(),
                    frame: frame.id(),
                })
            }
        };

        Ok(Source {
            frame_index: frame.frame_index(),
            object_index,
            transform,
            local_psf,
            basis,
        })
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn object_index(&self) -> usize {
        self.object_index
    }

    /// Object coordinates → frame pixel coordinates.
    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    pub fn local_psf(&self) -> Option<&Arc<dyn LocalPsf>> {
        self.local_psf.as_ref()
    }

    /// Basis rendered in this frame: the object basis convolved with the local PSF, the
    /// bare object basis for a frame without PSF, or `None` for a point source (the local
    /// PSF itself is then the model).
    pub fn basis(&self) -> Option<&Arc<dyn ModelBasis>> {
        self.basis.as_ref()
    }
}

fn object_position(object: &Object) -> Result<Point2<f64>, MultifitError> {
    object
        .position()
        .map(|p| *p.value())
        .ok_or(MultifitError::MissingPosition(object.id()))
}
