//! Crystal lattice geometry for reciprocal-space unit conversion
//!
#![doc = include_str!("../readme.md")]

mod error;
mod lattice;

#[doc(inline)]
pub use crate::lattice::{d_star, Lattice, LatticeParameters};

#[doc(inline)]
pub use crate::error::{Error, Result};
