//! Result and Error types for the fit module

/// Type alias for `Result<T, fit::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `hfxs-fit`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    IOError(#[from] std::io::Error),

    /// Failure to parse a configuration file
    #[error("invalid configuration")]
    YamlError(#[from] serde_yaml::Error),

    /// Failure to parse a candidate table
    #[error("invalid candidate table")]
    CsvError(#[from] csv::Error),

    /// Anything from building histograms or writing the store
    #[error(transparent)]
    HistError(#[from] hfxs_hist::Error),

    /// Per-interval settings that do not line up with the pT intervals
    #[error("'{field}' has {found} entries for {expected} pT intervals")]
    ConfigLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// A model with nothing to fit
    #[error("model has no components")]
    EmptyModel,

    /// Too few or identical values to build a template
    #[error("template needs at least two distinct values, found {found}")]
    TemplateTooSmall { found: usize },

    /// Parameter list and bounds do not pair up
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: &'static str },

    /// The minimiser itself failed to run
    #[error("minimiser failure: {0}")]
    Minimiser(String),
}
