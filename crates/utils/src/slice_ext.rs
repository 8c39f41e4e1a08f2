use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt {
    /// Find the minimum value in float arrays
    ///
    /// Only provides the minimum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use hfxs_utils::SliceExt;
    /// # use hfxs_utils::Error;
    /// // Successful cases
    /// assert_eq!([1.1, 0.5, 2.2].try_min(), Ok(0.5));
    /// assert_eq!([1.1, f64::MIN, 2.2].try_min(), Ok(f64::MIN));
    ///
    /// // Error cases
    /// assert_eq!([1.1, f64::NAN, 2.2].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::SliceContainsNoValues));
    /// ```
    ///
    /// Uses `total_cmp` to always produce an ordering in accordance to the
    /// IEEE 754 totalOrder predicate.
    fn try_min(&self) -> Result<f64>;

    /// Find the maximum value in float arrays
    ///
    /// Only provides the maximum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use hfxs_utils::SliceExt;
    /// # use hfxs_utils::Error;
    /// assert_eq!([1.1, 0.5, 2.2].try_max(), Ok(2.2));
    /// assert_eq!([1.1, f64::INFINITY].try_max(), Err(Error::SliceContainsUndefinedValues));
    /// ```
    fn try_max(&self) -> Result<f64>;

    /// Find index of the bin containing `value`, where bins are low <= value < high
    ///
    /// A value on a bin edge returns the bin above. Values equal to the highest
    /// edge are considered part of the last bin, so the full axis range is
    /// always covered.
    ///
    /// ```text
    ///     edges: 2.0 4.0 6.0 8.0
    ///
    ///     2.0 <= bin 0 < 4.0
    ///     4.0 <= bin 1 < 6.0
    ///     6.0 <= bin 2 <= 8.0
    /// ```
    ///
    /// ```rust
    /// # use hfxs_utils::SliceExt;
    /// let edges: Vec<f64> = vec![2.0, 4.0, 6.0, 8.0];
    ///
    /// assert_eq!(edges.find_bin_exclusive(2.0), Ok(0));
    /// assert_eq!(edges.find_bin_exclusive(4.0), Ok(1));
    /// assert_eq!(edges.find_bin_exclusive(7.9), Ok(2));
    /// assert_eq!(edges.find_bin_exclusive(8.0), Ok(2));
    ///
    /// // Values outside the axis are an error case
    /// assert!(edges.find_bin_exclusive(1.0).is_err());
    /// assert!(edges.find_bin_exclusive(8.1).is_err());
    /// ```
    fn find_bin_exclusive(&self, value: f64) -> Result<usize>;

    /// Square root of the sum of squares
    ///
    /// The usual combination of independent uncertainties.
    ///
    /// ```rust
    /// # use hfxs_utils::SliceExt;
    /// assert_eq!([3.0_f64, 4.0].quadrature(), 5.0);
    /// assert_eq!(Vec::<f64>::new().quadrature(), 0.0);
    /// ```
    fn quadrature(&self) -> f64;

    /// Sum of absolute values
    ///
    /// Fully correlated uncertainties add linearly.
    ///
    /// ```rust
    /// # use hfxs_utils::SliceExt;
    /// assert_eq!([3.0_f64, -4.0].linear_abs_sum(), 7.0);
    /// ```
    fn linear_abs_sum(&self) -> f64;
}

impl SliceExt for [f64] {
    fn try_min(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };

        self.iter()
            .min_by(|a, b| a.total_cmp(b))
            .copied()
            .ok_or(Error::SliceContainsNoValues)
    }

    fn try_max(&self) -> Result<f64> {
        if self.iter().any(|v| !v.is_finite()) {
            return Err(Error::SliceContainsUndefinedValues);
        };

        self.iter()
            .max_by(|a, b| a.total_cmp(b))
            .copied()
            .ok_or(Error::SliceContainsNoValues)
    }

    fn find_bin_exclusive(&self, value: f64) -> Result<usize> {
        // make sure there are bin edges to check against
        let n = self.len();
        let (Some(lower_bound), Some(upper_bound)) = (self.first(), self.last()) else {
            return Err(Error::BelowMinimumSliceLength {
                length: n,
                minimum_required: 2,
            });
        };
        if n < 2 {
            return Err(Error::BelowMinimumSliceLength {
                length: n,
                minimum_required: 2,
            });
        }

        // is the value relevant?
        if value < *lower_bound || value > *upper_bound {
            return Err(Error::ValueOutsideOfBounds {
                value,
                lower_bound: *lower_bound,
                upper_bound: *upper_bound,
            });
        }

        // special case for being on the upper edge
        if value == *upper_bound {
            return Ok(n - 2);
        }

        // edges are ascending, so the first upper edge above the value wins
        self.windows(2)
            .position(|w| w[0] <= value && value < w[1])
            .ok_or(Error::EdgesNotAscending { value })
    }

    fn quadrature(&self) -> f64 {
        self.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn linear_abs_sum(&self) -> f64 {
        self.iter().map(|v| v.abs()).sum()
    }
}
