#![warn(clippy::unwrap_used)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Raster primitives and raster dataset access.

pub type Result<T = ()> = std::result::Result<T, Error>;

mod arraydatatype;
mod arraynum;
mod cell;
mod densearray;
mod error;
#[cfg(feature = "gdal")]
pub mod gdalinterop;
mod georeference;
mod geotransform;
mod nodata;
pub mod raster;
mod rastersize;
#[cfg(feature = "gdal")]
mod runtimeconfiguration;
#[cfg(test)]
mod testutils;
mod window;

#[doc(inline)]
pub use arraydatatype::ArrayDataType;
#[doc(inline)]
pub use arraynum::ArrayNum;
#[doc(inline)]
pub use cell::Cell;
#[doc(inline)]
pub use cell::CellIterator;
#[doc(inline)]
pub use densearray::DenseArray;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use georeference::GeoReference;
#[doc(inline)]
pub use geotransform::GeoTransform;
#[doc(inline)]
pub use nodata::Nodata;
#[doc(inline)]
pub use raster::BandStatistics;
#[doc(inline)]
pub use raster::MemoryRaster;
#[doc(inline)]
pub use raster::Raster;
#[doc(inline)]
pub use raster::RasterFileFormat;
#[doc(inline)]
pub use raster::RasterReader;
#[doc(inline)]
pub use raster::RasterWriter;
#[doc(inline)]
pub use rastersize::RasterSize;
#[cfg(feature = "gdal")]
#[doc(inline)]
pub use raster::GdalRaster;
#[cfg(feature = "gdal")]
pub use runtimeconfiguration::RuntimeConfiguration;
#[doc(inline)]
pub use window::Window;
