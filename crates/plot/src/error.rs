//! Result and Error types for the plot module

// external crates
use plotters::drawing::DrawingAreaErrorKind;

/// Type alias for `Result<T, plot::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `hfxs-plot`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    IOError(#[from] std::io::Error),

    /// Failure to read a figure configuration
    #[error("invalid figure configuration")]
    YamlError(#[from] serde_yaml::Error),

    /// Missing or inconsistent input objects
    #[error(transparent)]
    HistError(#[from] hfxs_hist::Error),

    /// Anything the drawing backend reports
    #[error("unable to draw figure: {0}")]
    Drawing(String),

    /// Axis ranges that cannot be drawn
    #[error("invalid {axis} range [{lo}, {hi}]")]
    InvalidRange {
        axis: &'static str,
        lo: f64,
        hi: f64,
    },

    /// Particle name without a known decay channel
    #[error("unknown particle '{0}', expected B0, Bplus or Bs")]
    UnknownParticle(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for Error {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Error::Drawing(e.to_string())
    }
}
