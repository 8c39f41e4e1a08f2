//! `hfxs` is a semi-modular toolkit of libraries for heavy-flavour
//! cross-section measurements
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use hfxs_hist as hist;

#[doc(inline)]
pub use hfxs_utils as utils;

#[cfg(feature = "fit")]
#[cfg_attr(docsrs, doc(cfg(feature = "fit")))]
#[doc(inline)]
pub use hfxs_fit as fit;

#[cfg(feature = "fonll")]
#[cfg_attr(docsrs, doc(cfg(feature = "fonll")))]
#[doc(inline)]
pub use hfxs_fonll as fonll;

#[cfg(feature = "grid")]
#[cfg_attr(docsrs, doc(cfg(feature = "grid")))]
#[doc(inline)]
pub use hfxs_grid as grid;

#[cfg(feature = "plot")]
#[cfg_attr(docsrs, doc(cfg(feature = "plot")))]
#[doc(inline)]
pub use hfxs_plot as plot;

#[cfg(feature = "theory")]
#[cfg_attr(docsrs, doc(cfg(feature = "theory")))]
#[doc(inline)]
pub use hfxs_theory as theory;

#[cfg(feature = "xsec")]
#[cfg_attr(docsrs, doc(cfg(feature = "xsec")))]
#[doc(inline)]
pub use hfxs_xsec as xsec;
