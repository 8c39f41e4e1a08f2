//! Raw yields from binned maximum-likelihood fits of invariant-mass spectra
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod config;
mod error;
mod extract;
mod fitter;
mod minimise;
mod model;

// Inline anything important for a nice public API
#[doc(inline)]
pub use extract::{
    extract_from_config, extract_raw_yields, read_candidates, Extraction, MassCandidate,
};

#[doc(inline)]
pub use fitter::MassFit;

#[doc(inline)]
pub use model::{BackgroundShape, BinnedNll, FitModel, Kde, Part, SignalShape};

#[doc(inline)]
pub use minimise::{minimise, propagate, Minimum, MinimiserSettings, Objective, Parameter};

#[doc(inline)]
pub use config::{FitConfig, FitInputs, FitOutputs, FitSettings, PtIntegratedFit, Selections};

#[doc(inline)]
pub use error::{Error, Result};
