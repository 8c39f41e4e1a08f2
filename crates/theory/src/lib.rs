//! Theory predictions as text tables, splines and store objects
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod convert;
mod error;
mod model;
mod spline;
mod table;

// Inline anything important for a nice public API
#[doc(inline)]
pub use model::{Model, Prediction, PredictionSplines};

#[doc(inline)]
pub use spline::Spline;

#[doc(inline)]
pub use table::Table;

#[doc(inline)]
pub use convert::{
    convert_fonll, convert_fonll_table, convert_model, convert_nnlo_nnll, ratio_file_name,
    ratio_suffix, read_band_rows, BandRow, NnloBinning,
};

#[doc(inline)]
pub use error::{Error, Result};
