//! Basis frames for a cut
//!
//! A [Frame] is the set of three basis vectors `{u, v, w}` that define the
//! axes of the cut, each expressed as coefficients along H, K and L.

// crate modules
use crate::error::{Error, Result};

// external crates
use nalgebra::{Matrix3, RowVector3, Vector3};
use serde::{Deserialize, Serialize};

/// Ordered triple of coefficients along (H, K, L)
///
/// Used both as a basis vector and as a point in reciprocal space.
pub type Direction = [f64; 3];

/// Frames whose normalised determinant falls below this are singular
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Three basis vectors `{u, v, w}` defining the axes of a cut
///
/// The basis matrix `M` has `u`, `v` and `w` as its rows. Vectors need not be
/// orthogonal or normalised, but must be linearly independent for any
/// coordinates to be expressed in the frame.
///
/// ```rust
/// # use mdtools_cut::Frame;
/// // w is derived as v x u when not given explicitly
/// let frame = Frame::from_uv([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
/// assert_eq!(frame.w, [0.0, 0.0, -1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// First basis vector
    pub u: Direction,
    /// Second basis vector
    pub v: Direction,
    /// Third basis vector
    pub w: Direction,
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

impl Frame {
    /// Frame from three explicit basis vectors
    pub fn new(u: Direction, v: Direction, w: Direction) -> Self {
        Self { u, v, w }
    }

    /// The native (H, K, L) frame
    pub fn identity() -> Self {
        Self {
            u: [1.0, 0.0, 0.0],
            v: [0.0, 1.0, 0.0],
            w: [0.0, 0.0, 1.0],
        }
    }

    /// Frame from `u` and `v`, with `w = v x u`
    ///
    /// Note the order. The handedness of `v x u` is what ends up in labels
    /// and the `W_MATRIX` annotation, so it must not be swapped for `u x v`.
    pub fn from_uv(u: Direction, v: Direction) -> Self {
        let w = Vector3::from(v).cross(&Vector3::from(u));
        Self {
            u,
            v,
            w: [w.x, w.y, w.z],
        }
    }

    /// Frame from the rows of a basis matrix
    pub fn from_matrix(matrix: &Matrix3<f64>) -> Self {
        let row = |i: usize| [matrix[(i, 0)], matrix[(i, 1)], matrix[(i, 2)]];
        Self {
            u: row(0),
            v: row(1),
            w: row(2),
        }
    }

    /// Basis vectors in `[u, v, w]` order
    pub fn axes(&self) -> [Direction; 3] {
        [self.u, self.v, self.w]
    }

    /// Basis matrix `M` with rows `u`, `v`, `w`
    pub fn matrix(&self) -> Matrix3<f64> {
        let row = |d: &Direction| RowVector3::new(d[0], d[1], d[2]);
        Matrix3::from_rows(&[row(&self.u), row(&self.v), row(&self.w)])
    }

    /// Determinant of the basis matrix
    pub fn determinant(&self) -> f64 {
        self.matrix().determinant()
    }

    /// Inverse of the basis matrix, `M^-1`
    ///
    /// The determinant is normalised by the lengths of the basis vectors
    /// before comparing against the tolerance so that the check does not
    /// depend on the overall scale of the frame.
    ///
    /// ```rust
    /// # use mdtools_cut::{Error, Frame};
    /// // Parallel u and v can not span reciprocal space
    /// let frame = Frame::from_uv([1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
    /// assert!(matches!(frame.inverse_matrix(), Err(Error::SingularBasis { .. })));
    /// ```
    pub fn inverse_matrix(&self) -> Result<Matrix3<f64>> {
        let m = self.matrix();
        let determinant = m.determinant();
        let scale: f64 = self
            .axes()
            .iter()
            .map(|d| Vector3::from(*d).norm())
            .product();

        let normalised = (determinant / scale).abs();
        if !determinant.is_finite() || scale == 0.0 || normalised < SINGULAR_TOLERANCE {
            return Err(Error::SingularBasis { determinant });
        }

        m.try_inverse().ok_or(Error::SingularBasis { determinant })
    }

    /// The frame whose basis matrix is `M^-1`
    pub fn inverse(&self) -> Result<Frame> {
        Ok(Self::from_matrix(&self.inverse_matrix()?))
    }

    /// Express a point given in (H, K, L) in this frame, `p . M^-1`
    ///
    /// ```rust
    /// # use mdtools_cut::Frame;
    /// let frame = Frame::new([2.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]);
    /// assert_eq!(frame.map_point([1.0, 1.0, 1.0]).unwrap(), [0.5, 1.0, 1.0]);
    /// ```
    pub fn map_point(&self, point: Direction) -> Result<Direction> {
        let m_inv = self.inverse_matrix()?;
        let mapped = RowVector3::new(point[0], point[1], point[2]) * m_inv;
        Ok([mapped[0], mapped[1], mapped[2]])
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "u={:?} v={:?} w={:?}", self.u, self.v, self.w)
    }
}
