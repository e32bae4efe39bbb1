//! Conversion of basis vectors between r.l.u. and inverse Angstrom

// standard library
use std::collections::BTreeSet;
use std::f64::consts::TAU;

// crate modules
use crate::error::{Error, Result};
use crate::frame::{Direction, Frame};

// external crates
use log::{debug, trace};
use mdtools_lattice::Lattice;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Unit of a cut axis
///
/// Tags are written as the single characters used in projection tables,
/// `"r"` and `"a"`.
///
/// ```rust
/// # use mdtools_cut::UnitTag;
/// assert_eq!("a".parse::<UnitTag>(), Ok(UnitTag::InverseAngstrom));
/// assert_eq!(UnitTag::Rlu.to_string(), "r");
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum UnitTag {
    /// Reciprocal lattice units, scaled by the crystal lattice
    #[default]
    #[serde(rename = "r")]
    Rlu,
    /// Inverse Angstrom, independent of the lattice
    #[serde(rename = "a")]
    InverseAngstrom,
}

impl UnitTag {
    /// Single character tag, i.e. 'r', 'a'
    pub fn symbol(&self) -> &'static str {
        match self {
            UnitTag::Rlu => "r",
            UnitTag::InverseAngstrom => "a",
        }
    }
}

impl std::str::FromStr for UnitTag {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim() {
            "r" => Ok(UnitTag::Rlu),
            "a" => Ok(UnitTag::InverseAngstrom),
            other => Err(format!("unknown unit tag \"{other}\"")),
        }
    }
}

impl std::fmt::Display for UnitTag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Check whether a conversion from `origin` to `target` does anything
///
/// The comparison is between the *sets* of tags, not the tags per axis. For
/// example `[r, a, a]` and `[a, r, r]` are considered equal, and no scaling
/// is applied.
pub fn needs_scaling(origin: &[UnitTag; 3], target: &[UnitTag; 3]) -> bool {
    let origin: BTreeSet<_> = origin.iter().collect();
    let target: BTreeSet<_> = target.iter().collect();
    origin != target
}

/// Rescale each basis vector from `origin` to `target` units
///
/// For every axis with differing tags the basis vector is multiplied
/// (r.l.u. to inverse Angstrom) or divided (inverse Angstrom to r.l.u.) by
/// `2pi d*`, where d* is taken for the axis direction normalised to unit
/// length. Axes with matching tags are left alone.
///
/// The frame is returned untouched if the sets of tags match, see
/// [needs_scaling()].
///
/// ```rust
/// # use mdtools_cut::{scale, Frame, UnitTag};
/// # use mdtools_lattice::Lattice;
/// use std::f64::consts::TAU;
///
/// let lattice = Lattice::cubic(TAU).unwrap();
/// let rlu = [UnitTag::Rlu; 3];
/// let inv = [UnitTag::InverseAngstrom; 3];
///
/// // 2pi d* = 1 for a cubic cell with a = 2pi
/// let frame = scale(&Frame::identity(), &rlu, &inv, &lattice).unwrap();
/// assert!((frame.u[0] - 1.0).abs() < 1e-12);
/// ```
pub fn scale(
    frame: &Frame,
    origin: &[UnitTag; 3],
    target: &[UnitTag; 3],
    lattice: &Lattice,
) -> Result<Frame> {
    if !needs_scaling(origin, target) {
        trace!("Units {origin:?} -> {target:?} need no scaling");
        return Ok(*frame);
    }

    let mut axes = frame.axes();
    for (axis, (from, to)) in axes.iter_mut().zip(origin.iter().zip(target.iter())) {
        if from == to {
            continue;
        }

        let factor = TAU * lattice.d_star(unit_direction(axis, frame)?);
        *axis = match to {
            UnitTag::Rlu => axis.map(|c| c / factor),
            UnitTag::InverseAngstrom => axis.map(|c| c * factor),
        };
        trace!("Scaled axis {from} -> {to} by 2pi d* = {factor}");
    }

    let scaled = Frame::new(axes[0], axes[1], axes[2]);
    debug!("Scaled frame {scaled}");
    Ok(scaled)
}

/// Normalise an axis to unit length, the zero vector has no direction
fn unit_direction(axis: &Direction, frame: &Frame) -> Result<Direction> {
    let v = Vector3::from(*axis);
    let norm = v.norm();
    if norm == 0.0 || !norm.is_finite() {
        return Err(Error::SingularBasis {
            determinant: frame.determinant(),
        });
    }
    Ok(axis.map(|c| c / norm))
}
