use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Find the minimum value in float arrays
    ///
    /// Only provides the minimum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use mdtools_utils::SliceExt;
    /// # use mdtools_utils::Error;
    /// // Successful cases
    /// assert_eq!([1.1, 0.5, 2.2].try_min(), Ok(0.5));
    /// assert_eq!([1.1, f64::MIN, 2.2].try_min(), Ok(f64::MIN));
    ///
    /// // Error cases
    /// assert_eq!([1.1, f64::NAN, 2.2].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!([1.1, f64::INFINITY, 2.2].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::SliceContainsNoValues));
    /// ```
    ///
    /// The float primitives do not implement `Ord` due to `NaN` being
    /// incomparable. This extension uses `total_cmp` to always produce an
    /// ordering in accordance to the totalOrder predicate of IEEE 754.
    fn try_min(&self) -> Result<T>;

    /// Find the maximum value in float arrays
    ///
    /// Only provides the maximum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use mdtools_utils::SliceExt;
    /// # use mdtools_utils::Error;
    /// // Successful cases
    /// assert_eq!([1.1, 0.5, 2.2].try_max(), Ok(2.2));
    /// assert_eq!([1.1, f64::MAX, 2.2].try_max(), Ok(f64::MAX));
    ///
    /// // Error cases
    /// assert_eq!([1.1, f64::NAN, 2.2].try_max(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_max(), Err(Error::SliceContainsNoValues));
    /// ```
    fn try_max(&self) -> Result<T>;

    /// Find both the minimum and maximum as a `(min, max)` pair
    ///
    /// Convenience for bounding a set of coordinates along one axis, with the
    /// same error conditions as [try_min()](SliceExt::try_min).
    ///
    /// ```rust
    /// # use mdtools_utils::SliceExt;
    /// let coordinates = [0.5, -1.0, 2.0, 0.0];
    /// assert_eq!(coordinates.try_bounds(), Ok((-1.0, 2.0)));
    /// ```
    fn try_bounds(&self) -> Result<(T, T)>;
}

impl SliceExt<f64> for [f64] {
    fn try_min(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };

        if let Some(v) = self.iter().min_by(|a, b| a.total_cmp(b)).copied() {
            Ok(v)
        } else {
            Err(Error::SliceContainsNoValues)
        }
    }

    fn try_max(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };

        if let Some(v) = self.iter().max_by(|a, b| a.total_cmp(b)).copied() {
            Ok(v)
        } else {
            Err(Error::SliceContainsNoValues)
        }
    }

    fn try_bounds(&self) -> Result<(f64, f64)> {
        Ok((self.try_min()?, self.try_max()?))
    }
}
