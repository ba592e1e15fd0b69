use thiserror::Error;

use crate::constants::{FilterId, Id};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MultifitError {
    #[error("Inconsistent coordinate systems: {0}")]
    InconsistentCoordinateSystem(String),

    #[error("Object {object} has no basis and frame {frame} has no PSF")]
    MissingBasisOrPsf { object: Id, frame: Id },

    #[error("Object {0} has no position component but one is required to build its sources")]
    MissingPosition(Id),

    #[error("Object with ID {0} not found")]
    ObjectNotFound(Id),

    #[error("Frame with ID {0} not found")]
    FrameNotFound(Id),

    #[error("Filter with ID {0} not found")]
    FilterNotFound(FilterId),

    #[error("No model basis registered under the name '{0}'")]
    BasisNotFound(String),

    #[error("Frame {frame} has {found} weights but its footprint covers {expected} pixels")]
    WeightsSizeMismatch {
        frame: Id,
        expected: usize,
        found: usize,
    },

    #[error("Parameter buffer holds {found} values but {expected} are required")]
    ParameterBufferSize { expected: usize, found: usize },

    #[error("Invalid grid parameters: {0}")]
    InvalidGridParams(String),
}
