//! Result and Error types for the grid module

/// Type alias for `Result<T, grid::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `hfxs-grid`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    IOError(#[from] std::io::Error),

    /// The worker pool could not be started
    #[error("unable to build the worker pool")]
    PoolError(#[from] rayon::ThreadPoolBuildError),

    /// An external tool exited with a failure
    #[error("'{command}' failed with exit code {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    /// An external tool could not be started at all
    #[error("unable to run '{program}'")]
    MissingTool {
        program: String,
        source: std::io::Error,
    },

    /// No directories listed in the input file
    #[error("no output directories in '{path}'")]
    NoDirectories { path: String },

    /// Nothing was downloaded that could be merged
    #[error("no AO2D files found to merge")]
    NothingToMerge,
}
