//! Result and Error types for the utils module

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, PartialEq)]
/// The error type for `hfxs-utils`
pub enum Error {
    #[error("no values to compare")]
    SliceContainsNoValues,

    #[error("values include NaN or infinity")]
    SliceContainsUndefinedValues,

    /// Bin edges were not ascending, so no bin could be found
    #[error("no bin contains {value}, are the edges ascending?")]
    EdgesNotAscending { value: f64 },

    #[error("{value} is outside of [{lower_bound}, {upper_bound}]")]
    ValueOutsideOfBounds {
        value: f64,
        lower_bound: f64,
        upper_bound: f64,
    },

    #[error("{length} values given, at least {minimum_required} required")]
    BelowMinimumSliceLength {
        length: usize,
        minimum_required: usize,
    },
}

#[cfg(test)]
mod tests {
    use crate::SliceExt;

    #[test]
    fn errors_display_their_values() {
        let edges = [0.0, 1.0, 2.0];
        let error = edges.find_bin_exclusive(3.5).unwrap_err();
        assert_eq!(error.to_string(), "3.5 is outside of [0, 2]");

        let error = [1.0].find_bin_exclusive(1.0).unwrap_err();
        assert_eq!(error.to_string(), "1 values given, at least 2 required");

        let error = Vec::<f64>::new().try_max().unwrap_err();
        assert_eq!(error.to_string(), "no values to compare");
    }
}
