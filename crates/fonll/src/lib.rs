//! Harvesting of heavy-quark production predictions from the FONLL form
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod client;
mod config;
mod error;
mod harvest;
mod page;

// Inline anything important for a nice public API
#[doc(inline)]
pub use config::{sample_config, Bound, Field, FieldType, FonllConfig, Prediction};

#[doc(inline)]
pub use client::{FormClient, HttpClient};

#[doc(inline)]
pub use harvest::{
    process_prediction, run, run_parallel, run_sequential, ProcessingResult, Summary,
};

#[doc(inline)]
pub use page::{
    file_name, form_pairs, links, pre_block, resolve_link, result_links, url_encode,
    RESULT_EXTENSIONS,
};

#[doc(inline)]
pub use error::{Error, Result};
