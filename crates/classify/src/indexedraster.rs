//! Whole raster variants of the indexed band encoding.
//!
//! These read the complete extent of a dataset at once, only use them for rasters that fit in memory.
//! The tiled pipeline is the way to process large rasters.

use geo::{ArrayDataType, DenseArray, GeoTransform, RasterReader, RasterSize, RasterWriter, Window};

use crate::{DEFAULT_NODATA, Error, FeatureMatrix, RasterDescriptor, Result, ValidPixelIndex, indexedband};

/// Properties of a band that was encoded
#[derive(Debug, Clone, PartialEq)]
pub struct BandProperties {
    pub columns: usize,
    pub rows: usize,
    pub data_type: ArrayDataType,
    pub block_size: RasterSize,
    pub nodata: Option<f64>,
}

/// Metadata of an encoded raster, needed to write the bands back
#[derive(Debug, Clone, PartialEq)]
pub struct RasterProperties {
    pub width: usize,
    pub height: usize,
    pub projection: String,
    pub geo_transform: GeoTransform,
    pub bands: Vec<BandProperties>,
}

impl RasterProperties {
    fn from_descriptor(descriptor: &RasterDescriptor, band_count: usize) -> Self {
        RasterProperties {
            width: descriptor.width,
            height: descriptor.height,
            projection: descriptor.projection.clone(),
            geo_transform: descriptor.geo_transform,
            bands: descriptor
                .bands()
                .iter()
                .take(band_count)
                .map(|band| BandProperties {
                    columns: descriptor.width,
                    rows: descriptor.height,
                    data_type: band.data_type,
                    block_size: band.block_size,
                    nodata: band.nodata,
                })
                .collect(),
        }
    }

    pub fn raster_size(&self) -> RasterSize {
        RasterSize::with_rows_cols(self.height, self.width)
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }
}

fn read_full_band(reader: &impl RasterReader, band_index: usize) -> Result<DenseArray<f64>> {
    let window = Window::covering(reader.raster_size());
    reader
        .read_band_window(band_index, window)
        .map_err(|source| Error::Read { window, source })
}

/// Encode the first `max_bands` bands of a raster.
/// When no nodata value is provided the nodata value of the first band is used.
pub fn read_indexed_raster(
    reader: &impl RasterReader,
    max_bands: usize,
    nodata: Option<f64>,
) -> Result<(ValidPixelIndex, FeatureMatrix, RasterProperties)> {
    if max_bands < 1 {
        return Err(Error::Config("The maximum number of bands must be at least 1".to_string()));
    }

    let descriptor = RasterDescriptor::describe(reader)?;
    let band_count = max_bands.min(descriptor.band_count());
    let nodata = nodata.or(descriptor.nodata()).unwrap_or(DEFAULT_NODATA);

    let bands = (1..=band_count)
        .map(|band_index| read_full_band(reader, band_index))
        .collect::<Result<Vec<_>>>()?;

    let (index, matrix) = indexedband::encode(&bands, nodata)?;
    log::debug!(
        "Encoded {band_count} band(s) of {}: {} valid pixels",
        descriptor.raster_size(),
        index.len()
    );

    Ok((index, matrix, RasterProperties::from_descriptor(&descriptor, band_count)))
}

/// Encode the first band of each of the rasters as if they were the bands of a single raster.
/// At least two rasters are required and they must all have the same size.
/// The georeference of the first raster is used for the properties.
pub fn read_indexed_raster_list<R: RasterReader>(
    readers: &[R],
    nodata: Option<f64>,
) -> Result<(ValidPixelIndex, FeatureMatrix, RasterProperties)> {
    if readers.len() < 2 {
        return Err(Error::Config(format!(
            "At least 2 rasters are required to build a band stack, got {}",
            readers.len()
        )));
    }

    let descriptors = readers.iter().map(RasterDescriptor::describe).collect::<Result<Vec<_>>>()?;
    let reference = &descriptors[0];
    if let Some(desc) = descriptors.iter().find(|desc| desc.raster_size() != reference.raster_size()) {
        return Err(Error::Raster(geo::Error::SizeMismatch {
            size1: reference.raster_size(),
            size2: desc.raster_size(),
        }));
    }

    let nodata = nodata.or(reference.nodata()).unwrap_or(DEFAULT_NODATA);
    let bands = readers.iter().map(|reader| read_full_band(reader, 1)).collect::<Result<Vec<_>>>()?;
    let (index, matrix) = indexedband::encode(&bands, nodata)?;

    let mut properties = RasterProperties::from_descriptor(reference, 1);
    properties.bands = descriptors
        .iter()
        .flat_map(|desc| RasterProperties::from_descriptor(desc, 1).bands)
        .collect();

    Ok((index, matrix, properties))
}

/// Write every feature column as a band of the destination, pixels that are not in the index get the nodata value.
/// The destination needs at least as many bands as there are feature columns.
pub fn write_indexed_raster<W: RasterWriter>(
    writer: &mut W,
    index: &[geo::Cell],
    matrix: &FeatureMatrix,
    properties: &RasterProperties,
    nodata: f64,
) -> Result {
    let size = properties.raster_size();
    if writer.raster_size() != size {
        return Err(Error::Raster(geo::Error::SizeMismatch {
            size1: size,
            size2: writer.raster_size(),
        }));
    }

    let bands = indexedband::decode_bands(index, matrix, size, nodata)?;
    if bands.len() > writer.band_count() {
        return Err(Error::Config(format!(
            "The destination has {} band(s), {} are needed",
            writer.band_count(),
            bands.len()
        )));
    }

    writer.set_georeference(&properties.projection, properties.geo_transform)?;

    let window = Window::covering(size);
    for (band_index, band) in (1..).zip(&bands) {
        writer
            .write_band_window(band_index, window, band)
            .map_err(|source| Error::Write { window, source })?;
        writer.set_nodata(band_index, nodata)?;
    }

    writer.flush()?;
    Ok(())
}
