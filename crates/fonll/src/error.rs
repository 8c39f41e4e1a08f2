//! Result and Error types for the fonll module

/// Type alias for `Result<T, fonll::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
/// The error type for `hfxs-fonll`
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    IOError(#[from] std::io::Error),

    /// Failure to read or write a configuration file
    #[error("invalid configuration")]
    YamlError(#[from] serde_yaml::Error),

    /// Anything from the HTTP client
    #[error("request failed")]
    HttpError(#[from] minreq::Error),

    /// The worker pool could not be started
    #[error("unable to build the worker pool")]
    PoolError(#[from] rayon::ThreadPoolBuildError),

    /// A response other than success, with whatever page came back
    #[error("'{url}' returned status {code}")]
    HttpStatus { url: String, code: i32, body: String },

    /// A required setting is missing or empty
    #[error("configuration is missing '{name}'")]
    MissingSetting { name: &'static str },

    /// An interval bound that is not a finite number
    #[error("'{text}' is not a valid interval bound")]
    InvalidBound { text: String },

    /// The result page had neither links nor a text block
    #[error("no results found on the page for '{name}'")]
    NoResults { name: String },
}
