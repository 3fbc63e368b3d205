#![warn(clippy::unwrap_used)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Out-of-core classification of multi-band rasters.
//!
//! A raster is partitioned in windows by the [`TileScheduler`], the valid pixels of every window are
//! encoded in a [`FeatureMatrix`] and passed to a [`Classifier`]. The labels are scattered back into a
//! tile that is written to the [`OutputSink`].

pub type Result<T = ()> = std::result::Result<T, Error>;

mod classifier;
mod descriptor;
mod error;
mod featurematrix;
pub mod indexedband;
pub mod indexedraster;
pub mod ndi;
mod outputsink;
mod pipeline;
mod scheduler;

#[doc(inline)]
pub use classifier::Classifier;
#[doc(inline)]
pub use classifier::LabelRange;
#[doc(inline)]
pub use classifier::RangeClassifier;
#[doc(inline)]
pub use descriptor::BandDescriptor;
#[doc(inline)]
pub use descriptor::RasterDescriptor;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use error::PredictionError;
#[doc(inline)]
pub use featurematrix::BandLayout;
#[doc(inline)]
pub use featurematrix::FeatureMatrix;
#[doc(inline)]
pub use indexedband::ValidPixelIndex;
#[doc(inline)]
pub use outputsink::OutputSink;
#[doc(inline)]
pub use pipeline::ClassificationOptions;
#[doc(inline)]
pub use pipeline::ClassificationSummary;
#[doc(inline)]
pub use pipeline::DEFAULT_NODATA;
pub use pipeline::classify_raster;
pub use pipeline::classify_tile;
pub use pipeline::classify_tiled;
#[doc(inline)]
pub use scheduler::TileScheduler;
#[doc(inline)]
pub use scheduler::TileSize;
