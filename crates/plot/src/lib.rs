//! Publication figures for cross sections, efficiencies and mass fits
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod compare;
mod efficiency;
mod error;
mod mass;
mod style;

// Inline anything important for a nice public API
#[doc(inline)]
pub use compare::{
    comparison_figure, draw_comparison, ComparisonConfig, ComparisonData, Measurement,
    PredictionBand, Reference,
};

#[doc(inline)]
pub use efficiency::{efficiency_figure, Particle};

#[doc(inline)]
pub use mass::{mass_fit_figure, residual_figure};

#[doc(inline)]
pub use style::{tab10, TAB10};

#[doc(inline)]
pub use error::{Error, Result};
