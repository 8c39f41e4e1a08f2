//! Parallel download and merging of analysis outputs from the grid
//!
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod download;
mod error;
mod merge;
mod tools;

// Inline anything important for a nice public API
#[doc(inline)]
pub use download::{
    download_all, download_and_merge, download_train, read_directories, train_id,
    DownloadOptions, TaskOutcome, TrainDownload,
};

#[doc(inline)]
pub use merge::{bunches, merge_outputs, merged_aod_name, MergeReport};

#[doc(inline)]
pub use tools::{AlienCatalog, Catalog, Merger, O2Merger};

#[doc(inline)]
pub use error::{Error, Result};
