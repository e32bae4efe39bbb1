//! Result and Error types for mdtools-lattice

/// Type alias for Result<T, lattice::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `mdtools-lattice` crate
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid lattice [a, b, c, alpha, beta, gamma] = {parameters:?}: {reason}")]
    InvalidLattice {
        parameters: [f64; 6],
        reason: &'static str,
    },
}
