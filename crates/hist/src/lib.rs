//! Histograms, graphs and the object store shared by every hfxs procedure
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod graph;
mod hist;
mod store;

// Inline anything important for a nice public API
#[doc(inline)]
pub use hist::Hist1D;

#[doc(inline)]
pub use graph::{Graph, Point};

#[doc(inline)]
pub use store::{Object, Store};

#[doc(inline)]
pub use error::{Error, Result};
