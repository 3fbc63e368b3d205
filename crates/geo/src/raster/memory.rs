use crate::{
    ArrayDataType, ArrayNum, DenseArray, Error, GeoReference, GeoTransform, RasterSize, Result, Window,
    raster::{self, BandStatistics, Raster, RasterReader, RasterWriter},
};

/// Raster that keeps all bands in memory.
/// Pixels are stored band sequential as f64 regardless of the reported data type.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    size: RasterSize,
    data_type: ArrayDataType,
    bands: Vec<Vec<f64>>,
    nodata: Vec<Option<f64>>,
    projection: String,
    geo_transform: GeoTransform,
    block_size: RasterSize,
}

impl MemoryRaster {
    /// Create a raster with `band_count` bands where every pixel is set to `fill`
    pub fn new(size: RasterSize, band_count: usize, data_type: ArrayDataType, fill: f64) -> Self {
        MemoryRaster {
            size,
            data_type,
            bands: vec![vec![fill; size.cell_count()]; band_count],
            nodata: vec![None; band_count],
            projection: String::new(),
            geo_transform: GeoTransform::default(),
            block_size: RasterSize::with_rows_cols(1, size.cols),
        }
    }

    /// Create a raster from row-major band data, every band must contain `size.cell_count()` values
    pub fn from_bands(size: RasterSize, data_type: ArrayDataType, bands: Vec<Vec<f64>>) -> Result<Self> {
        if let Some(band) = bands.iter().find(|band| band.len() != size.cell_count()) {
            return Err(Error::InvalidArgument(format!(
                "Band data length {} does not match the raster size {}",
                band.len(),
                size
            )));
        }

        Ok(MemoryRaster {
            size,
            data_type,
            nodata: vec![None; bands.len()],
            bands,
            projection: String::new(),
            geo_transform: GeoTransform::default(),
            block_size: RasterSize::with_rows_cols(1, size.cols),
        })
    }

    pub fn with_georeference(mut self, projection: &str, geo_transform: GeoTransform) -> Self {
        self.projection = projection.to_string();
        self.geo_transform = geo_transform;
        self
    }

    pub fn with_nodata(mut self, band_index: usize, nodata: Option<f64>) -> Result<Self> {
        raster::check_band_index(band_index, self.bands.len())?;
        self.nodata[band_index - 1] = nodata;
        Ok(self)
    }

    pub fn with_block_size(mut self, block_size: RasterSize) -> Self {
        self.block_size = block_size;
        self
    }

    /// The row-major values of a band
    pub fn band(&self, band_index: usize) -> Result<&[f64]> {
        raster::check_band_index(band_index, self.bands.len())?;
        Ok(&self.bands[band_index - 1])
    }

    pub fn nodata(&self, band_index: usize) -> Result<Option<f64>> {
        raster::check_band_index(band_index, self.bands.len())?;
        Ok(self.nodata[band_index - 1])
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn geo_transform(&self) -> GeoTransform {
        self.geo_transform
    }
}

impl Raster for MemoryRaster {
    fn raster_size(&self) -> RasterSize {
        self.size
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }
}

impl RasterReader for MemoryRaster {
    fn data_type(&self, band_index: usize) -> Result<ArrayDataType> {
        raster::check_band_index(band_index, self.bands.len())?;
        Ok(self.data_type)
    }

    fn georeference(&self, band_index: usize) -> Result<GeoReference> {
        Ok(GeoReference::new(
            self.projection.clone(),
            self.size,
            self.geo_transform,
            self.nodata(band_index)?,
        ))
    }

    fn block_size(&self, band_index: usize) -> Result<RasterSize> {
        raster::check_band_index(band_index, self.bands.len())?;
        Ok(self.block_size)
    }

    fn read_band_window<T: ArrayNum>(&self, band_index: usize, window: Window) -> Result<DenseArray<T>> {
        let band = self.band(band_index)?;
        raster::check_window(window, self.size)?;

        let mut data = Vec::with_capacity(window.cell_count());
        for row in window.y_offset..window.y_offset + window.height {
            let start = row * self.size.cols + window.x_offset;
            data.extend(band[start..start + window.width].iter().map(|&v| T::from_f64_or_nodata(v)));
        }

        DenseArray::new(window.size(), data)
    }
}

impl RasterWriter for MemoryRaster {
    fn set_georeference(&mut self, projection: &str, geo_transform: GeoTransform) -> Result {
        self.projection = projection.to_string();
        self.geo_transform = geo_transform;
        Ok(())
    }

    fn write_band_window<T: ArrayNum>(&mut self, band_index: usize, window: Window, data: &DenseArray<T>) -> Result {
        raster::check_band_index(band_index, self.bands.len())?;
        raster::check_window(window, self.size)?;
        raster::check_window_data_size(window, data)?;

        let cols = self.size.cols;
        let band = &mut self.bands[band_index - 1];
        for (row_index, row) in data.as_slice().chunks(window.width.max(1)).enumerate() {
            let start = (window.y_offset + row_index) * cols + window.x_offset;
            for (dst, &src) in band[start..start + row.len()].iter_mut().zip(row) {
                *dst = src.to_f64_lossy();
            }
        }

        Ok(())
    }

    fn set_nodata(&mut self, band_index: usize, nodata: f64) -> Result {
        raster::check_band_index(band_index, self.bands.len())?;
        self.nodata[band_index - 1] = Some(nodata);
        Ok(())
    }

    fn compute_statistics(&mut self, band_index: usize) -> Result<Option<BandStatistics>> {
        let nodata = self.nodata(band_index)?;
        Ok(raster::compute_statistics(self.band(band_index)?.iter().copied(), nodata))
    }

    fn flush(&mut self) -> Result {
        Ok(())
    }
}
