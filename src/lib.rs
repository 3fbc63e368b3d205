#![cfg_attr(docsrs, feature(doc_cfg))]

//! Tiled, out-of-core classification of multi-band rasters.
//!
//! This crate bundles the workspace libraries:
//! - [`geo`]: raster primitives and the raster read/write backends
//! - [`classify`]: indexed band encoding and the tiled classification pipeline
//! - [`inf`]: progress reporting, cancellation and other small helpers

#[doc(inline)]
pub use classify;
#[doc(inline)]
pub use geo;
#[doc(inline)]
pub use inf;
