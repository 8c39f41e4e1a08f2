//! Cross sections from differential measurements and generator runs
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod config;
mod error;
mod generator;
mod integrate;

// Inline anything important for a nice public API
#[doc(inline)]
pub use integrate::{
    integrate, integrate_from_config, CrossSectionInputs, ExtrapolationFactor,
    IntegratedCrossSection, SourceUncertainty,
};

#[doc(inline)]
pub use generator::{
    collect_runs, generator_cross_section, generator_cross_section_from_config, Candidate,
    GeneratorRun,
};

#[doc(inline)]
pub use config::{
    GeneratorConfig, GeneratorInputs, IntegrateConfig, IntegrateInputs, Output, PtBins,
    Systematics,
};

#[doc(inline)]
pub use error::{Error, Result};
