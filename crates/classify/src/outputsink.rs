use geo::{ArrayDataType, ArrayNum, BandStatistics, DenseArray, MemoryRaster, RasterWriter, Window};

use crate::{Error, RasterDescriptor, Result};

const OUTPUT_BAND: usize = 1;

fn check_nodata(data_type: ArrayDataType, nodata: f64) -> Result {
    if !data_type.fits(nodata) {
        return Err(Error::Config(format!(
            "The output nodata value {nodata} can not be represented by the output data type {data_type}"
        )));
    }

    Ok(())
}

/// Owns the single band destination raster of a classification run.
/// Tiles are written directly to the destination, nothing beyond the tile being written is buffered.
pub struct OutputSink<W: RasterWriter> {
    writer: W,
    tiles_written: usize,
}

impl<W: RasterWriter> OutputSink<W> {
    /// Take ownership of the destination, which must match the source dimensions.
    /// The georeference of the source is applied and the nodata value is set upfront
    /// so regions that never receive a tile read back as nodata.
    /// The nodata value must be representable by the data type of the destination.
    pub fn open(mut writer: W, descriptor: &RasterDescriptor, data_type: ArrayDataType, nodata: f64) -> Result<Self> {
        check_nodata(data_type, nodata)?;

        if writer.raster_size() != descriptor.raster_size() {
            return Err(Error::Raster(geo::Error::SizeMismatch {
                size1: descriptor.raster_size(),
                size2: writer.raster_size(),
            }));
        }

        if writer.band_count() == 0 {
            return Err(Error::Config("The output raster has no bands".to_string()));
        }

        writer.set_georeference(&descriptor.projection, descriptor.geo_transform)?;
        writer.set_nodata(OUTPUT_BAND, nodata)?;

        Ok(OutputSink { writer, tiles_written: 0 })
    }

    /// Write a tile at the window offset, the tile size must match the window size.
    pub fn write_tile<T: ArrayNum>(&mut self, tile: &DenseArray<T>, window: Window) -> Result {
        self.writer
            .write_band_window(OUTPUT_BAND, window, tile)
            .map_err(|source| Error::Write { window, source })?;
        self.tiles_written += 1;
        Ok(())
    }

    pub fn tiles_written(&self) -> usize {
        self.tiles_written
    }

    /// Set the nodata value and compute the statistics of the completed output.
    /// Consumes the sink, the destination is returned so the caller decides when it gets closed.
    pub fn finalize(mut self, nodata: f64) -> Result<(W, Option<BandStatistics>)> {
        self.writer.set_nodata(OUTPUT_BAND, nodata)?;
        self.writer.flush()?;
        let stats = self.writer.compute_statistics(OUTPUT_BAND)?;

        match &stats {
            Some(stats) => log::debug!("Output statistics: {stats}"),
            None => log::debug!("Output contains no valid pixels"),
        }

        Ok((self.writer, stats))
    }
}

impl OutputSink<MemoryRaster> {
    /// In memory destination, every pixel starts out as nodata
    pub fn create_in_memory(descriptor: &RasterDescriptor, data_type: ArrayDataType, nodata: f64) -> Result<Self> {
        let raster = MemoryRaster::new(descriptor.raster_size(), 1, data_type, nodata);
        OutputSink::open(raster, descriptor, data_type, nodata)
    }
}

#[cfg(feature = "gdal")]
impl OutputSink<geo::GdalRaster> {
    /// Create the destination file, the format is derived from the file extension
    pub fn create(path: impl AsRef<std::path::Path>, descriptor: &RasterDescriptor, data_type: ArrayDataType, nodata: f64) -> Result<Self> {
        check_nodata(data_type, nodata)?;

        let raster = geo::GdalRaster::create_for_path(path, descriptor.raster_size(), 1, data_type)?;
        OutputSink::open(raster, descriptor, data_type, nodata)
    }
}
