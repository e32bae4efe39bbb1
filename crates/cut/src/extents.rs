//! Extents of a cut expressed in a new basis

// crate modules
use crate::error::Result;
use crate::frame::{Direction, Frame};

// mdtools modules
use mdtools_utils::SliceExt;

// external crates
use itertools::iproduct;
use log::{debug, trace};
use nalgebra::RowVector3;
use serde::{Deserialize, Serialize};

/// An ordered `(min, max)` range along one axis
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl Extent {
    /// New extent from `min` and `max`
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the extent, `max - min`
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Both bounds as `[min, max]`
    pub fn bounds(&self) -> [f64; 2] {
        [self.min, self.max]
    }
}

impl From<(f64, f64)> for Extent {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {})", self.min, self.max)
    }
}

/// The 8 corners of an axis-aligned (H, K, L) box
///
/// Corners are ordered with L varying fastest, then K, then H.
pub fn corners(extents: &[Extent; 3]) -> [Direction; 8] {
    let mut corners = [[0.0; 3]; 8];
    let points = iproduct!(
        extents[0].bounds(),
        extents[1].bounds(),
        extents[2].bounds()
    );
    for (corner, (h, k, l)) in corners.iter_mut().zip(points) {
        *corner = [h, k, l];
    }
    corners
}

/// Bounding extents of an (H, K, L) box expressed in another basis
///
/// Every corner `p` of the input box is mapped into the new basis as
/// `p . M^-1`, where `M` is the basis matrix of `frame`. The extent along
/// each new axis is then the minimum and maximum over all 8 mapped corners.
///
/// For bases that are not aligned with (H, K, L) the result is the
/// axis-aligned box enclosing the rotated region, so it is never smaller than
/// the true region.
///
/// ```rust
/// # use mdtools_cut::{transform, Extent, Frame};
/// let extents = [Extent::new(-1.0, 1.0); 3];
///
/// // Diagonal basis in the HK plane
/// let frame = Frame::from_uv([1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]);
/// let cut = transform(&frame, &extents).unwrap();
///
/// // The corner (1, 1, l) lies at 1 along u
/// assert_eq!(cut[0], Extent::new(-1.0, 1.0));
/// ```
///
/// Fails with [Error::SingularBasis](crate::Error::SingularBasis) if the
/// basis vectors are not linearly independent.
pub fn transform(frame: &Frame, extents: &[Extent; 3]) -> Result<[Extent; 3]> {
    let m_inv = frame.inverse_matrix()?;

    let mapped = corners(extents).map(|p| {
        let q = RowVector3::new(p[0], p[1], p[2]) * m_inv;
        trace!("Corner {p:?} -> {q:?}");
        [q[0], q[1], q[2]]
    });

    let mut transformed = [Extent::default(); 3];
    for (axis, extent) in transformed.iter_mut().enumerate() {
        let coordinates = mapped.iter().map(|q| q[axis]).collect::<Vec<f64>>();
        *extent = coordinates.try_bounds()?.into();
    }

    debug!("Transformed extents {transformed:?}");
    Ok(transformed)
}
