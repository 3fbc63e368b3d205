use geo::{ArrayDataType, GeoTransform, RasterReader, RasterSize};

use crate::{Error, Result};

/// Per band metadata of a raster
#[derive(Debug, Clone, PartialEq)]
pub struct BandDescriptor {
    pub data_type: ArrayDataType,
    pub nodata: Option<f64>,
    pub block_size: RasterSize,
}

/// Metadata snapshot of a raster dataset, taken once when the dataset is opened.
/// Always describes at least one band.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterDescriptor {
    pub width: usize,
    pub height: usize,
    pub projection: String,
    pub geo_transform: GeoTransform,
    bands: Vec<BandDescriptor>,
}

impl RasterDescriptor {
    /// Read the metadata of the raster, fails with [`Error::Describe`] when the metadata is unreadable.
    /// The raster must contain at least one band.
    pub fn describe(reader: &impl RasterReader) -> Result<Self> {
        let band_count = reader.band_count();
        if band_count == 0 {
            return Err(Error::Describe(geo::Error::InvalidArgument("Raster contains no bands".to_string())));
        }

        let georef = reader.georeference(1).map_err(Error::Describe)?;
        let bands = (1..=band_count)
            .map(|band_index| {
                Ok(BandDescriptor {
                    data_type: reader.data_type(band_index)?,
                    nodata: reader.georeference(band_index)?.nodata(),
                    block_size: reader.block_size(band_index)?,
                })
            })
            .collect::<geo::Result<Vec<_>>>()
            .map_err(Error::Describe)?;

        let size = reader.raster_size();
        Ok(RasterDescriptor {
            width: size.cols,
            height: size.rows,
            projection: georef.projection().to_string(),
            geo_transform: georef.geo_transform(),
            bands,
        })
    }

    pub fn raster_size(&self) -> RasterSize {
        RasterSize::with_rows_cols(self.height, self.width)
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn bands(&self) -> &[BandDescriptor] {
        &self.bands
    }

    /// The data type of the first band
    pub fn data_type(&self) -> ArrayDataType {
        self.bands[0].data_type
    }

    /// The nodata value of the first band
    pub fn nodata(&self) -> Option<f64> {
        self.bands[0].nodata
    }

    /// Band metadata, the band index is 1-based
    pub fn band(&self, band_index: usize) -> Option<&BandDescriptor> {
        band_index.checked_sub(1).and_then(|idx| self.bands.get(idx))
    }
}

impl std::fmt::Display for RasterDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} pixels, {} band(s) of {}, nodata: {}",
            self.width,
            self.height,
            self.band_count(),
            self.data_type(),
            self.nodata().map_or_else(|| "none".to_string(), |nod| nod.to_string())
        )
    }
}
