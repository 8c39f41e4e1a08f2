//! Result and Error types for the xsec module

/// Type alias for `Result<T, xsec::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `hfxs-xsec`
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

    /// Invalid glob pattern for generator runs
    #[error("invalid file pattern")]
    PatternError(#[from] glob::PatternError),

    /// Anything from reading or building histograms
    #[error(transparent)]
    HistError(#[from] hfxs_hist::Error),

    /// A systematic histogram is not binned like the statistical one
    #[error("systematic '{name}' has different binning to '{reference}'")]
    BinningMismatch { name: String, reference: String },

    /// The extrapolation graph has nothing to take a factor from
    #[error("extrapolation graph '{name}' has no points")]
    EmptyExtrapolation { name: String },

    /// Relative uncertainties are undefined for a zero cross section
    #[error("visible cross section is zero")]
    VanishingCrossSection,

    /// Lower and upper pT bounds do not pair up
    #[error("{mins} lower and {maxs} upper pT bounds given")]
    PtBoundsMismatch { mins: usize, maxs: usize },

    /// Nothing usable matched the run pattern
    #[error("no generator runs found for '{pattern}'")]
    NoGeneratorRuns { pattern: String },

    /// Runs were found but no events were accepted
    #[error("no accepted events in any generator run")]
    NoAcceptedEvents,
}
