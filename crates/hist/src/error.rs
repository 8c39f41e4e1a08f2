//! Result and Error types for the hist module

/// Type alias for `Result<T, hist::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `hfxs-hist`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    IOError(#[from] std::io::Error),

    /// Failure to (de)serialise a binary store
    #[error("failed bincode operation")]
    BincodeError(#[from] Box<bincode::ErrorKind>),

    /// Failure to (de)serialise a JSON store
    #[error("failed serde JSON operation")]
    JSONError(#[from] serde_json::Error),

    /// A histogram needs at least two edges to define a bin
    #[error("at least 2 bin edges are required, found {found}")]
    TooFewEdges { found: usize },

    /// Bin edges must be strictly ascending
    #[error("bin edges are not strictly ascending at index {index}")]
    EdgesNotAscending { index: usize },

    /// Contents or errors do not match the number of bins
    #[error("{what} has length {found}, expected {expected}")]
    InconsistentLength {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Bin-wise operations need identical binning
    #[error("binning of '{left}' and '{right}' differ")]
    BinningMismatch { left: String, right: String },

    /// Point-wise operations need the same number of points
    #[error("graphs have {left} and {right} points")]
    PointCountMismatch { left: usize, right: usize },

    /// Bin index past the last bin
    #[error("bin {bin} is out of range for {nbins} bins")]
    BinOutOfRange { bin: usize, nbins: usize },

    /// A graph without points where at least one is needed
    #[error("graph '{name}' has no points")]
    EmptyGraph { name: String },

    /// Negative error bars are meaningless
    #[error("negative error component in point {index}")]
    NegativeError { index: usize },

    /// Key not present in the store
    #[error("object '{key}' not found in store")]
    ObjectNotFound { key: String },

    /// Key present but holding the other kind of object
    #[error("object '{key}' is not a {expected}")]
    WrongObjectType { key: String, expected: &'static str },
}
