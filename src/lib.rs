//! `mdtools` is a semi-modular toolkit for planning cuts of multidimensional
//! reciprocal-space data
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use mdtools_utils as utils;

#[cfg(feature = "lattice")]
#[cfg_attr(docsrs, doc(cfg(feature = "lattice")))]
#[doc(inline)]
pub use mdtools_lattice as lattice;

#[cfg(feature = "cut")]
#[cfg_attr(docsrs, doc(cfg(feature = "cut")))]
#[doc(inline)]
pub use mdtools_cut as cut;
