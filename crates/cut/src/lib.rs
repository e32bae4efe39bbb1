//! Planning of multidimensional cuts on arbitrary crystallographic bases
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod binning;
mod dataset;
mod error;
mod extents;
mod frame;
mod labels;
mod plan;
mod projection;
mod request;
mod slice;
mod units;

// inline the pipeline stages for a nice public API
#[doc(inline)]
pub use projection::{resolve as resolve_projection, Cell, ProjectionSpec, ProjectionTable};

#[doc(inline)]
pub use frame::{Direction, Frame};

#[doc(inline)]
pub use units::{needs_scaling, scale, UnitTag};

#[doc(inline)]
pub use extents::{corners, transform, Extent};

#[doc(inline)]
pub use binning::{resolve, resolve_all, BinDescriptor, ResolvedBin, MAX_BINS};

#[doc(inline)]
pub use labels::{label, labels, AXIS_SYMBOLS};

#[doc(inline)]
pub use plan::{plan_many, CutPlan, EnergyAxis, OutputMode, Stage};

#[doc(inline)]
pub use slice::{cut, BasisVector, OutputMetadata, SliceExecutor, SliceRequest, W_MATRIX};

#[doc(inline)]
pub use dataset::{CoordinateSystem, DatasetInfo, Dimension, MdDataset};

#[doc(inline)]
pub use request::CutRequest;

#[doc(inline)]
pub use error::{Error, Result};
