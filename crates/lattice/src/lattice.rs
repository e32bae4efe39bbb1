// crate modules
use crate::error::{Error, Result};

// external crates
use log::trace;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Unit cell of a crystal lattice
///
/// Holds the six lattice parameters, lengths `a`, `b`, `c` in Angstrom and
/// angles `alpha`, `beta`, `gamma` in degrees, along with the reciprocal
/// metric tensor derived from them.
///
/// Parameters are validated on construction:
///
/// - all lengths must be positive and finite
/// - all angles must be within (0, 180) degrees
/// - the angles must close into a cell with a real, positive volume
///
/// ```rust
/// # use mdtools_lattice::Lattice;
/// // Hexagonal cell
/// let lattice = Lattice::new(3.0, 3.0, 5.0, 90.0, 90.0, 120.0).unwrap();
/// assert_eq!(lattice.gamma(), 120.0);
///
/// // Angles that can not form a cell are rejected
/// assert!(Lattice::new(1.0, 1.0, 1.0, 60.0, 60.0, 150.0).is_err());
/// ```
///
/// A [Lattice] (de)serialises as the plain parameter set, and validation is
/// applied when deserialising.
///
/// ```json
/// { "a": 3.0, "b": 3.0, "c": 5.0, "alpha": 90.0, "beta": 90.0, "gamma": 120.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatticeParameters", into = "LatticeParameters")]
pub struct Lattice {
    parameters: LatticeParameters,
    /// Reciprocal metric tensor G* (no 2pi factor)
    g_star: Matrix3<f64>,
}

/// Raw, unvalidated unit cell parameters
///
/// Convert into a [Lattice] with `Lattice::try_from()` to validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeParameters {
    /// Length a (Angstrom)
    pub a: f64,
    /// Length b (Angstrom)
    pub b: f64,
    /// Length c (Angstrom)
    pub c: f64,
    /// Angle between b and c (degrees)
    pub alpha: f64,
    /// Angle between a and c (degrees)
    pub beta: f64,
    /// Angle between a and b (degrees)
    pub gamma: f64,
}

impl LatticeParameters {
    fn as_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alpha, self.beta, self.gamma]
    }

    fn invalid(&self, reason: &'static str) -> Error {
        Error::InvalidLattice {
            parameters: self.as_array(),
            reason,
        }
    }

    /// Direct metric tensor G
    fn metric_tensor(&self) -> Matrix3<f64> {
        let (ca, cb, cg) = (
            self.alpha.to_radians().cos(),
            self.beta.to_radians().cos(),
            self.gamma.to_radians().cos(),
        );
        let (a, b, c) = (self.a, self.b, self.c);

        Matrix3::new(
            a * a,
            a * b * cg,
            a * c * cb,
            a * b * cg,
            b * b,
            b * c * ca,
            a * c * cb,
            b * c * ca,
            c * c,
        )
    }
}

impl TryFrom<LatticeParameters> for Lattice {
    type Error = Error;

    fn try_from(parameters: LatticeParameters) -> Result<Self> {
        if [parameters.a, parameters.b, parameters.c]
            .iter()
            .any(|l| !l.is_finite() || *l <= 0.0)
        {
            return Err(parameters.invalid("lengths must be positive"));
        }

        if [parameters.alpha, parameters.beta, parameters.gamma]
            .iter()
            .any(|t| !t.is_finite() || *t <= 0.0 || *t >= 180.0)
        {
            return Err(parameters.invalid("angles must be within (0, 180) degrees"));
        }

        // det(G) = V^2, anything else is not a physical cell
        let g = parameters.metric_tensor();
        if g.determinant() <= 0.0 {
            return Err(parameters.invalid("angles do not describe a cell with positive volume"));
        }

        let g_star = g
            .try_inverse()
            .ok_or_else(|| parameters.invalid("metric tensor is not invertible"))?;

        trace!("Reciprocal metric tensor {g_star:?}");
        Ok(Self { parameters, g_star })
    }
}

impl From<Lattice> for LatticeParameters {
    fn from(lattice: Lattice) -> Self {
        lattice.parameters
    }
}

impl Lattice {
    /// Build a validated lattice from lengths (Angstrom) and angles (degrees)
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        Self::try_from(LatticeParameters {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        })
    }

    /// Cubic cell with side length `a`
    pub fn cubic(a: f64) -> Result<Self> {
        Self::new(a, a, a, 90.0, 90.0, 90.0)
    }

    /// Length `a` (Angstrom)
    pub fn a(&self) -> f64 {
        self.parameters.a
    }

    /// Length `b` (Angstrom)
    pub fn b(&self) -> f64 {
        self.parameters.b
    }

    /// Length `c` (Angstrom)
    pub fn c(&self) -> f64 {
        self.parameters.c
    }

    /// Angle between `b` and `c` (degrees)
    pub fn alpha(&self) -> f64 {
        self.parameters.alpha
    }

    /// Angle between `a` and `c` (degrees)
    pub fn beta(&self) -> f64 {
        self.parameters.beta
    }

    /// Angle between `a` and `b` (degrees)
    pub fn gamma(&self) -> f64 {
        self.parameters.gamma
    }

    /// All six parameters as `[a, b, c, alpha, beta, gamma]`
    pub fn parameters(&self) -> [f64; 6] {
        self.parameters.as_array()
    }

    /// Direct space metric tensor G
    pub fn metric_tensor(&self) -> Matrix3<f64> {
        self.parameters.metric_tensor()
    }

    /// Reciprocal space metric tensor G* = G^-1
    pub fn reciprocal_metric_tensor(&self) -> Matrix3<f64> {
        self.g_star
    }

    /// Unit cell volume (Angstrom^3)
    ///
    /// ```rust
    /// # use mdtools_lattice::Lattice;
    /// let lattice = Lattice::new(2.0, 3.0, 4.0, 90.0, 90.0, 90.0).unwrap();
    /// assert!((lattice.volume() - 24.0).abs() < 1e-12);
    /// ```
    pub fn volume(&self) -> f64 {
        self.metric_tensor().determinant().sqrt()
    }

    /// Magnitude of a reciprocal lattice vector, d* = 1/d
    ///
    /// The direction is given in reciprocal lattice units (h, k, l) and the
    /// result is `sqrt(hkl . G* . hkl)` in inverse Angstrom, without the 2pi
    /// factor. The result is symmetric under `hkl -> -hkl` and only zero for
    /// the zero vector.
    ///
    /// ```rust
    /// # use mdtools_lattice::Lattice;
    /// let lattice = Lattice::cubic(2.0).unwrap();
    /// assert!((lattice.d_star([1.0, 0.0, 0.0]) - 0.5).abs() < 1e-12);
    /// assert!((lattice.d_star([0.0, -3.0, 0.0]) - 1.5).abs() < 1e-12);
    /// ```
    pub fn d_star(&self, hkl: [f64; 3]) -> f64 {
        let q = Vector3::from(hkl);
        // G* is positive definite, clamp away any rounding below zero
        q.dot(&(self.g_star * q)).max(0.0).sqrt()
    }

    /// Interplanar spacing d = 1/d* (Angstrom)
    ///
    /// The zero vector has no spacing and results in `f64::INFINITY`.
    pub fn d_spacing(&self, hkl: [f64; 3]) -> f64 {
        1.0 / self.d_star(hkl)
    }
}

impl std::fmt::Display for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "a={} b={} c={} alpha={} beta={} gamma={}",
            self.a(),
            self.b(),
            self.c(),
            self.alpha(),
            self.beta(),
            self.gamma()
        )
    }
}

/// Convenience for [Lattice::d_star()]
///
/// ```rust
/// # use mdtools_lattice::{d_star, Lattice};
/// let lattice = Lattice::cubic(4.0).unwrap();
/// assert!((d_star([1.0, 1.0, 0.0], &lattice) - 2f64.sqrt() / 4.0).abs() < 1e-12);
/// ```
pub fn d_star(direction: [f64; 3], lattice: &Lattice) -> f64 {
    lattice.d_star(direction)
}
