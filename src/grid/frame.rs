use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};

use crate::constants::{FilterId, Id, Pixel};
use crate::definition;
use crate::primitives::{Footprint, Psf, Wcs};

/// A frame of a [`Grid`](super::Grid), placed in the flattened pixel vector.
#[derive(Debug)]
pub struct Frame {
    id: Id,
    filter_id: FilterId,
    footprint: Arc<Footprint>,
    psf: Option<Arc<dyn Psf>>,
    wcs: Option<Arc<dyn Wcs>>,
    weights: Option<Arc<DVector<Pixel>>>,
    pixel_offset: usize,
    pixel_count: usize,
    filter_index: usize,
    frame_index: usize,
}

impl Frame {
    pub(crate) fn from_definition(
        def: &definition::Frame,
        pixel_offset: usize,
        filter_index: usize,
        frame_index: usize,
    ) -> Self {
        Frame {
            id: def.id(),
            filter_id: def.filter_id(),
            footprint: Arc::clone(def.footprint()),
            psf: def.psf().cloned(),
            wcs: def.wcs().cloned(),
            weights: def.weights().cloned(),
            pixel_offset,
            pixel_count: def.footprint().area(),
            filter_index,
            frame_index,
        }
    }

    /// Shallow copy back into a definition frame.
    pub(crate) fn to_definition(&self) -> definition::Frame {
        definition::Frame::from_parts(
            self.id,
            self.filter_id,
            Arc::clone(&self.footprint),
            self.psf.clone(),
            self.wcs.clone(),
            self.weights.clone(),
        )
    }

    pub fn id(&self) -> Id {
        self.id
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

    /// Start of this frame's slice in the flattened pixel vector.
    pub fn pixel_offset(&self) -> usize {
        self.pixel_offset
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// `pixel_offset..pixel_offset + pixel_count`.
    pub fn pixel_range(&self) -> Range<usize> {
        self.pixel_offset..self.pixel_offset + self.pixel_count
    }

    /// Dense index of the frame's filter, in order of first appearance.
    pub fn filter_index(&self) -> usize {
        self.filter_index
    }

    /// Position of the frame in the grid's frame array.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Scale each row of `matrix` (one row per frame pixel) by the pixel weight.
    /// No-op for an unweighted frame.
    ///
    /// Panics
    /// ----------
    /// * If a weighted frame is given a matrix whose row count is not its pixel count.
    pub fn apply_weights_to_matrix(&self, matrix: &mut DMatrix<Pixel>) {
        if let Some(weights) = &self.weights {
            assert_eq!(
                matrix.nrows(),
                weights.len(),
                "frame {} weights {} pixels, got a matrix with {} rows",
                self.id,
                weights.len(),
                matrix.nrows()
            );
            for (mut row, w) in matrix.row_iter_mut().zip(weights.iter()) {
                row *= *w;
            }
        }
    }

    /// Scale each element of `vector` (one per frame pixel) by the pixel weight.
    /// No-op for an unweighted frame.
    ///
    /// Panics
    /// ----------
    /// * If a weighted frame is given a vector whose length is not its pixel count.
    pub fn apply_weights_to_vector(&self, vector: &mut DVector<Pixel>) {
        if let Some(weights) = &self.weights {
            assert_eq!(
                vector.len(),
                weights.len(),
                "frame {} weights {} pixels, got a vector of length {}",
                self.id,
                weights.len(),
                vector.len()
            );
            vector.component_mul_assign(&**weights);
        }
    }

    /// Σ ln(weight) over the frame's pixels; 0 for an unweighted frame.
    pub fn sum_log_weights(&self) -> f64 {
        self.weights
            .as_ref()
            .map_or(0.0, |weights| weights.iter().map(|w| w.ln()).sum())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame {} = {{filter {} (#{}), {} pix @ {}}}",
            self.id, self.filter_id, self.filter_index, self.pixel_count, self.pixel_offset
        )
    }
}
