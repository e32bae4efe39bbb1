//! Binning descriptors and their resolution into bin counts
//!
//! Users describe the binning of each dimension with one to three numbers:
//!
//! | Values              | Variant                        | Bins                   |
//! | ------------------- | ------------------------------ | ---------------------- |
//! | `[step]`            | [BinDescriptor::Step]          | `floor(range / step)`  |
//! | `[min, max]`        | [BinDescriptor::Range]         | 1, integrated          |
//! | `[min, step, max]`  | [BinDescriptor::RangeWithStep] | `floor(range / step)`  |
//!
//! Stepped binning keeps the lower bound and snaps the upper bound down to a
//! whole number of steps, so there is never a partial bin past the requested
//! range. The lower bound is never moved.

// crate modules
use crate::error::{Error, Result};
use crate::extents::Extent;

// external crates
use log::trace;
use serde::{Deserialize, Serialize};

/// Binning request for a single dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BinDescriptor {
    /// Bin width over the existing extent of the dimension
    Step(f64),
    /// Explicit `(min, max)` integrated into a single bin
    Range(f64, f64),
    /// Explicit `(min, step, max)`
    RangeWithStep(f64, f64, f64),
}

impl BinDescriptor {
    /// Interpret a list of user values for `dimension`
    ///
    /// ```rust
    /// # use mdtools_cut::{BinDescriptor, Error};
    /// assert_eq!(BinDescriptor::parse(0, &[0.1]).unwrap(), BinDescriptor::Step(0.1));
    /// assert_eq!(
    ///     BinDescriptor::parse(1, &[0.0, 0.5, 2.0]).unwrap(),
    ///     BinDescriptor::RangeWithStep(0.0, 0.5, 2.0)
    /// );
    ///
    /// // Nothing to go on
    /// assert!(matches!(
    ///     BinDescriptor::parse(2, &[]),
    ///     Err(Error::EmptyBinSpec { dimension: 2 })
    /// ));
    /// ```
    pub fn parse(dimension: usize, values: &[f64]) -> Result<Self> {
        match *values {
            [] => Err(Error::EmptyBinSpec { dimension }),
            [step] => Ok(Self::Step(step)),
            [min, max] => Ok(Self::Range(min, max)),
            [min, step, max] => Ok(Self::RangeWithStep(min, step, max)),
            _ => Err(Error::InvalidBinSpec {
                dimension,
                length: values.len(),
            }),
        }
    }
}

/// Number of bins and the range they cover for one dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBin {
    /// Number of bins, always at least 1
    pub bins: usize,
    /// Extent covered by the bins
    pub extent: Extent,
}

impl ResolvedBin {
    /// Width of each bin
    pub fn width(&self) -> f64 {
        self.extent.range() / self.bins as f64
    }
}

/// Resolve a binning request against the current extent of `dimension`
///
/// ```rust
/// # use mdtools_cut::{resolve, BinDescriptor, Extent};
/// let extent = Extent::new(0.0, 1.0);
///
/// // 0.3 fits three times, the upper bound moves down to 0.9
/// let bin = resolve(0, extent, BinDescriptor::Step(0.3)).unwrap();
/// assert_eq!(bin.bins, 3);
/// assert!((bin.extent.max - 0.9).abs() < 1e-12);
///
/// // A step larger than the range is clamped to a single bin
/// let bin = resolve(0, extent, BinDescriptor::Step(5.0)).unwrap();
/// assert_eq!(bin.bins, 1);
/// assert_eq!(bin.extent, extent);
/// ```
pub fn resolve(
    dimension: usize,
    extent: Extent,
    descriptor: BinDescriptor,
) -> Result<ResolvedBin> {
    let degenerate = |extent: Extent| Error::DegenerateBinning {
        dimension,
        descriptor,
        extent,
    };

    let resolved = match descriptor {
        BinDescriptor::Step(step) => {
            stepped(extent.min, step, extent.max).ok_or_else(|| degenerate(extent))?
        }
        BinDescriptor::Range(min, max) => {
            if !(min.is_finite() && max.is_finite()) || max < min {
                return Err(degenerate(Extent::new(min, max)));
            }
            ResolvedBin {
                bins: 1,
                extent: Extent::new(min, max),
            }
        }
        BinDescriptor::RangeWithStep(min, step, max) => {
            stepped(min, step, max).ok_or_else(|| degenerate(Extent::new(min, max)))?
        }
    };

    trace!("Dimension {dimension}: {descriptor:?} -> {resolved:?}");
    Ok(resolved)
}

/// Resolve every dimension in order, failing on the first bad request
pub fn resolve_all<I>(requests: I) -> Result<Vec<ResolvedBin>>
where
    I: IntoIterator<Item = (Extent, BinDescriptor)>,
{
    requests
        .into_iter()
        .enumerate()
        .map(|(dimension, (extent, descriptor))| resolve(dimension, extent, descriptor))
        .collect()
}

/// Upper limit on the number of bins along one dimension
pub const MAX_BINS: usize = u32::MAX as usize;

/// Whole number of steps from `min`, or `None` if not even one fits
///
/// The corrected upper bound never exceeds `max`, even when `min + n * step`
/// rounds past it.
fn stepped(min: f64, step: f64, max: f64) -> Option<ResolvedBin> {
    let range = max - min;
    if step >= range {
        // a single bin over the whole range, bounds untouched
        return (range.is_finite() && range > 0.0).then(|| ResolvedBin {
            bins: 1,
            extent: Extent::new(min, max),
        });
    }

    if !(step.is_finite() && step > 0.0) {
        return None;
    }

    let n = (range / step).floor();
    if !n.is_finite() || n < 1.0 || n > MAX_BINS as f64 {
        return None;
    }

    Some(ResolvedBin {
        bins: n as usize,
        extent: Extent::new(min, (min + n * step).min(max)),
    })
}
