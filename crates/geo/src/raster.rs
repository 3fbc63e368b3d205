//! Raster dataset access.
//!
//! A raster consists of one or more equally sized bands, band indexes are 1-based.
//! Reading and writing happens per band on rectangular [`Window`]s so callers never need
//! to hold a complete band in memory.

use std::path::Path;

use crate::{ArrayDataType, ArrayNum, DenseArray, Error, GeoReference, GeoTransform, RasterSize, Result, Window};

#[cfg(feature = "gdal")]
mod gdalraster;
mod memory;

#[cfg(feature = "gdal")]
pub use gdalraster::GdalRaster;
pub use memory::MemoryRaster;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterFileFormat {
    Memory,
    ArcAscii,
    GeoTiff,
    Png,
    PcRaster,
    Netcdf,
    GeoPackage,
    Vrt,
    Unknown,
}

impl RasterFileFormat {
    /// Given a file path, guess the raster type based on the file extension
    pub fn guess_from_path(file_path: impl AsRef<Path>) -> RasterFileFormat {
        let ext = file_path.as_ref().extension().map(|ext| ext.to_string_lossy().to_lowercase());

        match ext.as_deref() {
            Some("asc") => RasterFileFormat::ArcAscii,
            Some("tiff" | "tif") => RasterFileFormat::GeoTiff,
            Some("png") => RasterFileFormat::Png,
            Some("map") => RasterFileFormat::PcRaster,
            Some("nc") => RasterFileFormat::Netcdf,
            Some("gpkg") => RasterFileFormat::GeoPackage,
            Some("vrt") => RasterFileFormat::Vrt,
            _ => RasterFileFormat::Unknown,
        }
    }
}

/// Summary statistics of the valid (non nodata) pixels of a band
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
}

impl std::fmt::Display for BandStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "min: {:.4}, max: {:.4}, mean: {:.4}, stddev: {:.4}",
            self.min, self.max, self.mean, self.stddev
        )
    }
}

/// Dimensions shared by all bands of a raster
pub trait Raster {
    fn raster_size(&self) -> RasterSize;
    fn band_count(&self) -> usize;
}

/// Read access to the bands of a raster
pub trait RasterReader: Raster {
    /// The native pixel type of the band
    fn data_type(&self, band_index: usize) -> Result<ArrayDataType>;

    /// Projection, geotransform and nodata value of the band
    fn georeference(&self, band_index: usize) -> Result<GeoReference>;

    /// The natural block size of the band as stored by the backend
    fn block_size(&self, band_index: usize) -> Result<RasterSize>;

    /// Read a window of a band, pixel values are converted to `T`
    fn read_band_window<T: ArrayNum>(&self, band_index: usize, window: Window) -> Result<DenseArray<T>>;
}

/// Write access to the bands of a raster
pub trait RasterWriter: Raster {
    fn set_georeference(&mut self, projection: &str, geo_transform: GeoTransform) -> Result;

    /// Write the data at the window location, the data size has to match the window size
    fn write_band_window<T: ArrayNum>(&mut self, band_index: usize, window: Window, data: &DenseArray<T>) -> Result;

    fn set_nodata(&mut self, band_index: usize, nodata: f64) -> Result;

    /// Compute the statistics of the band, `None` when the band contains no valid pixels
    fn compute_statistics(&mut self, band_index: usize) -> Result<Option<BandStatistics>>;

    fn flush(&mut self) -> Result;
}

pub(crate) fn check_band_index(band_index: usize, band_count: usize) -> Result {
    if band_index == 0 || band_index > band_count {
        return Err(Error::InvalidBand { band_index, band_count });
    }

    Ok(())
}

pub(crate) fn check_window(window: Window, raster_size: RasterSize) -> Result {
    if !window.is_contained_in(raster_size) {
        return Err(Error::WindowOutOfBounds { window, raster_size });
    }

    Ok(())
}

pub(crate) fn check_window_data_size<T: ArrayNum>(window: Window, data: &DenseArray<T>) -> Result {
    if window.size() != data.size() {
        return Err(Error::SizeMismatch {
            size1: window.size(),
            size2: data.size(),
        });
    }

    Ok(())
}

/// Single pass (Welford) statistics over the values that are not nodata
pub(crate) fn compute_statistics(values: impl Iterator<Item = f64>, nodata: Option<f64>) -> Option<BandStatistics> {
    let mut count = 0usize;
    let mut mean = 0.0;
    let mut m2 = 0.0;
    let mut min = f64::MAX;
    let mut max = f64::MIN;

    for value in values {
        if value.is_nan() || nodata.is_some_and(|nod| value == nod) {
            continue;
        }

        count += 1;
        let delta = value - mean;
        mean += delta / count as f64;
        m2 += delta * (value - mean);
        min = min.min(value);
        max = max.max(value);
    }

    if count == 0 {
        return None;
    }

    Some(BandStatistics {
        min,
        max,
        mean,
        stddev: (m2 / count as f64).sqrt(),
    })
}
