//! Result and Error types for mdtools-cut

use crate::binning::BinDescriptor;
use crate::dataset::CoordinateSystem;
use crate::extents::Extent;

/// Type alias for Result<T, cut::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `mdtools-cut` crate
///
/// Every variant is a request-level failure. Nothing is retried, the request
/// has to be corrected and planned again.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise")]
    FailedSerde(#[from] serde_json::Error),

    #[error("invalid axis name pattern")]
    FailedRegex(#[from] regex::Error),

    #[error(transparent)]
    Lattice(#[from] mdtools_lattice::Error),

    #[error("non-finite coordinates in extents")]
    Utils(#[from] mdtools_utils::Error),

    #[error("invalid projection: {reason}")]
    InvalidProjection { reason: String },

    #[error("basis vectors are not linearly independent (det = {determinant:e})")]
    SingularBasis { determinant: f64 },

    #[error("dimension {index} named \"{name}\" is out of order, expected H, K, L")]
    AxisOrder { index: usize, name: String },

    #[error("binning for dimension {dimension} cannot be empty")]
    EmptyBinSpec { dimension: usize },

    #[error("binning for dimension {dimension} takes 1 to 3 values, found {length}")]
    InvalidBinSpec { dimension: usize, length: usize },

    #[error(
        "binning {descriptor:?} over {extent:?} gives fewer than 1 bin for dimension {dimension}"
    )]
    DegenerateBinning {
        dimension: usize,
        descriptor: BinDescriptor,
        extent: Extent,
    },

    #[error("unsupported dimensionality ({found} dimensions): {reason}")]
    UnsupportedDimensionality { found: usize, reason: &'static str },

    #[error("input must be in reciprocal lattice dimensions (HKL), found {found:?}")]
    WrongCoordinateSystem { found: CoordinateSystem },

    #[error("dataset has no sample lattice for unit conversion")]
    MissingLattice,

    #[error("dimension {index} requested from a dataset with {ndims} dimensions")]
    DimensionOutOfRange { index: usize, ndims: usize },

    #[error("slice execution failed: {0}")]
    Execution(String),
}
