//! Result and Error types for the theory module

/// Type alias for `Result<T, theory::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `hfxs-theory`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    IOError(#[from] std::io::Error),

    /// Anything from building histograms or graphs
    #[error(transparent)]
    HistError(#[from] hfxs_hist::Error),

    /// Raw nom crate errors
    #[error("parser error: {0}")]
    Nom(String),

    /// Data rows found before any column names
    #[error("no column names before the data on line {line}")]
    MissingHeader { line: usize },

    /// A data row with the wrong number of values
    #[error("line {line} has {found} values, expected {expected}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Column not present in a table
    #[error("column '{name}' not found")]
    MissingColumn { name: String },

    /// A table with no data rows
    #[error("table has no data rows")]
    EmptyTable,

    /// Table rows do not match the expected binning
    #[error("'{file}' has {found} rows, expected {expected}")]
    RowCount {
        file: String,
        expected: usize,
        found: usize,
    },

    /// Not enough points for a cubic spline
    #[error("spline needs at least {minimum} points, found {found}")]
    TooFewPoints { found: usize, minimum: usize },

    /// Knots must be strictly ascending
    #[error("spline knots not strictly ascending at index {index}")]
    KnotsNotAscending { index: usize },

    /// x and y values do not pair up
    #[error("{x} x values and {y} y values")]
    LengthMismatch { x: usize, y: usize },

    /// The spline equations could not be solved
    #[error("singular spline system")]
    SingularSystem,

    /// Model name not recognised
    #[error("unknown model '{name}'")]
    UnknownModel { name: String },
}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::Nom(format!("{err:?}"))
    }
}
