use std::{
    ffi::{CString, c_void},
    path::{Path, PathBuf},
};

use gdal::{cpl::CslStringList, errors::GdalError, raster::GdalDataType};

use crate::{
    ArrayDataType, ArrayNum, DenseArray, Error, GeoReference, GeoTransform, RasterSize, Result, Window,
    gdalinterop::{FALSE, check_pointer, check_rc, data_ptr, gdal_ordinal_for_data_type},
    raster::{self, BandStatistics, Raster, RasterFileFormat, RasterReader, RasterWriter},
};

const DEFAULT_GEO_TRANSFORM: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

impl RasterFileFormat {
    pub fn gdal_driver_name(&self) -> &str {
        match self {
            RasterFileFormat::Memory => "MEM",
            RasterFileFormat::ArcAscii => "AAIGrid",
            RasterFileFormat::GeoTiff => "GTiff",
            RasterFileFormat::Png => "PNG",
            RasterFileFormat::PcRaster => "PCRaster",
            RasterFileFormat::Netcdf => "netCDF",
            RasterFileFormat::GeoPackage => "GPKG",
            RasterFileFormat::Vrt => "VRT",
            RasterFileFormat::Unknown => "Unknown",
        }
    }

    fn creation_options(&self) -> &'static [&'static str] {
        match self {
            RasterFileFormat::GeoTiff => &["TILED=YES", "COMPRESS=LZW"],
            _ => &[],
        }
    }
}

impl TryFrom<GdalDataType> for ArrayDataType {
    type Error = Error;

    fn try_from(data_type: GdalDataType) -> Result<Self> {
        match data_type {
            GdalDataType::UInt8 => Ok(ArrayDataType::Uint8),
            GdalDataType::UInt16 => Ok(ArrayDataType::Uint16),
            GdalDataType::Int16 => Ok(ArrayDataType::Int16),
            GdalDataType::UInt32 => Ok(ArrayDataType::Uint32),
            GdalDataType::Int32 => Ok(ArrayDataType::Int32),
            GdalDataType::UInt64 => Ok(ArrayDataType::Uint64),
            GdalDataType::Int64 => Ok(ArrayDataType::Int64),
            GdalDataType::Float32 => Ok(ArrayDataType::Float32),
            GdalDataType::Float64 => Ok(ArrayDataType::Float64),
            other => Err(Error::Runtime(format!("Unsupported GDAL raster data type: {other:?}"))),
        }
    }
}

/// Raster backed by a GDAL dataset, the dataset is closed when the raster is dropped.
pub struct GdalRaster {
    ds: gdal::Dataset,
}

impl GdalRaster {
    pub fn from_dataset(ds: gdal::Dataset) -> Self {
        GdalRaster { ds }
    }

    pub fn dataset(&self) -> &gdal::Dataset {
        &self.ds
    }

    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let options = gdal::DatasetOptions {
            open_flags: gdal::GdalOpenFlags::GDAL_OF_READONLY | gdal::GdalOpenFlags::GDAL_OF_RASTER,
            ..Default::default()
        };

        Ok(GdalRaster::from_dataset(open_with_options(path, options)?))
    }

    /// Create a new raster, the driver is chosen based on the file extension.
    pub fn create_for_path(path: impl AsRef<Path>, size: RasterSize, band_count: usize, data_type: ArrayDataType) -> Result<Self> {
        let format = RasterFileFormat::guess_from_path(path.as_ref());
        if format == RasterFileFormat::Unknown {
            return Err(Error::InvalidArgument(format!(
                "Could not determine the raster format of the output path: {}",
                path.as_ref().display()
            )));
        }

        Self::create(path, size, band_count, data_type, format)
    }

    /// Create a new raster using the driver of the requested format.
    /// GeoTiff blocks that are never written read back as the band nodata value, or 0 when the band has no nodata.
    pub fn create(
        path: impl AsRef<Path>,
        size: RasterSize,
        band_count: usize,
        data_type: ArrayDataType,
        format: RasterFileFormat,
    ) -> Result<Self> {
        let path = path.as_ref();
        let cols = gdal_dimension(size.cols, "column count")?;
        let rows = gdal_dimension(size.rows, "row count")?;
        let bands = gdal_dimension(band_count, "band count")?;
        create_output_directory_if_needed(path)?;

        let driver = gdal::DriverManager::get_driver_by_name(format.gdal_driver_name())?;
        let mut options = CslStringList::new();
        for opt in format.creation_options() {
            options.add_string(opt)?;
        }

        let path_str = CString::new(path.to_string_lossy().as_ref())?;
        let ds_handle = check_pointer(
            unsafe {
                gdal_sys::GDALCreate(
                    driver.c_driver(),
                    path_str.as_ptr(),
                    cols,
                    rows,
                    bands,
                    gdal_ordinal_for_data_type(data_type)?,
                    options.as_ptr(),
                )
            },
            "GDALCreate",
        )
        .map_err(|err| Error::Runtime(format!("Failed to create raster {}: {err}", path.display())))?;

        log::debug!("Created {} raster {} ({size}, {band_count} bands, {data_type})", format.gdal_driver_name(), path.display());
        Ok(GdalRaster::from_dataset(unsafe { gdal::Dataset::from_c_dataset(ds_handle) }))
    }

    fn raster_band(&self, band_index: usize) -> Result<gdal::raster::RasterBand<'_>> {
        raster::check_band_index(band_index, self.band_count())?;
        Ok(self.ds.rasterband(band_index)?)
    }

    fn raster_io(&self, band_index: usize, window: Window, flag: gdal_sys::GDALRWFlag::Type, data_type: ArrayDataType, data: *mut c_void) -> Result {
        raster::check_window(window, self.raster_size())?;
        if window.is_empty() {
            return Ok(());
        }

        let x_offset = gdal_dimension(window.x_offset, "window x offset")?;
        let y_offset = gdal_dimension(window.y_offset, "window y offset")?;
        let width = gdal_dimension(window.width, "window width")?;
        let height = gdal_dimension(window.height, "window height")?;

        let band = self.raster_band(band_index)?;
        unsafe {
            check_rc(gdal_sys::GDALRasterIOEx(
                band.c_rasterband(),
                flag,
                x_offset,
                y_offset,
                width,
                height,
                data,
                width,
                height,
                gdal_ordinal_for_data_type(data_type)?,
                0,
                0,
                core::ptr::null_mut(),
            ))?;
        }

        Ok(())
    }
}

impl Raster for GdalRaster {
    fn raster_size(&self) -> RasterSize {
        let (width, height) = self.ds.raster_size();
        RasterSize::with_rows_cols(height, width)
    }

    fn band_count(&self) -> usize {
        self.ds.raster_count() as usize
    }
}

impl RasterReader for GdalRaster {
    fn data_type(&self, band_index: usize) -> Result<ArrayDataType> {
        ArrayDataType::try_from(self.raster_band(band_index)?.band_type())
    }

    fn georeference(&self, band_index: usize) -> Result<GeoReference> {
        let band = self.raster_band(band_index)?;
        Ok(GeoReference::new(
            self.ds.projection(),
            self.raster_size(),
            GeoTransform::new(self.ds.geo_transform().unwrap_or(DEFAULT_GEO_TRANSFORM)),
            band.no_data_value(),
        ))
    }

    fn block_size(&self, band_index: usize) -> Result<RasterSize> {
        let (block_x, block_y) = self.raster_band(band_index)?.block_size();
        Ok(RasterSize::with_rows_cols(block_y, block_x))
    }

    fn read_band_window<T: ArrayNum>(&self, band_index: usize, window: Window) -> Result<DenseArray<T>> {
        let band_type = self.data_type(band_index)?;
        check_if_metadata_fits(self.raster_band(band_index)?.no_data_value(), band_type, T::TYPE)?;

        let mut data = vec![T::zero(); window.cell_count()];
        self.raster_io(band_index, window, gdal_sys::GDALRWFlag::GF_Read, T::TYPE, data.as_mut_ptr().cast::<c_void>())?;
        DenseArray::new(window.size(), data)
    }
}

impl RasterWriter for GdalRaster {
    fn set_georeference(&mut self, projection: &str, geo_transform: GeoTransform) -> Result {
        if !projection.is_empty() {
            self.ds.set_projection(projection)?;
        }

        self.ds.set_geo_transform(&geo_transform.coefficients())?;
        Ok(())
    }

    fn write_band_window<T: ArrayNum>(&mut self, band_index: usize, window: Window, data: &DenseArray<T>) -> Result {
        raster::check_window_data_size(window, data)?;
        self.raster_io(band_index, window, gdal_sys::GDALRWFlag::GF_Write, T::TYPE, data_ptr(data.as_slice()))
    }

    fn set_nodata(&mut self, band_index: usize, nodata: f64) -> Result {
        let mut band = self.raster_band(band_index)?;
        band.set_no_data_value(Some(nodata))?;
        Ok(())
    }

    fn compute_statistics(&mut self, band_index: usize) -> Result<Option<BandStatistics>> {
        self.flush()?;

        let band = self.raster_band(band_index)?;
        let mut stats = BandStatistics {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            stddev: 0.0,
        };

        let rc = unsafe {
            gdal_sys::GDALComputeRasterStatistics(
                band.c_rasterband(),
                FALSE,
                &mut stats.min,
                &mut stats.max,
                &mut stats.mean,
                &mut stats.stddev,
                None,
                core::ptr::null_mut(),
            )
        };

        // Fails when the band only contains nodata
        if let Err(err) = check_rc(rc) {
            log::warn!("No statistics available for band {band_index}: {err}");
            return Ok(None);
        }

        Ok(Some(stats))
    }

    fn flush(&mut self) -> Result {
        self.ds.flush_cache()?;
        Ok(())
    }
}

fn open_with_options(path: impl AsRef<Path>, options: gdal::DatasetOptions) -> Result<gdal::Dataset> {
    let path = path.as_ref();
    gdal::Dataset::open_ex(path, options).map_err(|err| match err {
        // Match on the error to give a cleaner error message when the file does not exist
        GdalError::NullPointer { method_name: _, msg: _ } => {
            if !path.exists() {
                Error::InvalidPath(PathBuf::from(path))
            } else {
                let ras_type = RasterFileFormat::guess_from_path(path);
                if ras_type != RasterFileFormat::Unknown && gdal::DriverManager::get_driver_by_name(ras_type.gdal_driver_name()).is_err() {
                    return Error::Runtime(format!("Gdal driver not supported: {}", ras_type.gdal_driver_name()));
                }

                Error::Runtime(format!(
                    "Failed to open raster dataset ({}), check file correctness or driver configuration ({})",
                    path.to_string_lossy(),
                    err
                ))
            }
        }
        _ => Error::Runtime(format!("Failed to open raster dataset: {} ({})", path.to_string_lossy(), err)),
    })
}

fn gdal_dimension(value: usize, name: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::InvalidArgument(format!("The {name} ({value}) is too large for GDAL")))
}

fn create_output_directory_if_needed(path: &Path) -> Result {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    Ok(())
}

fn check_if_metadata_fits(nodata: Option<f64>, source_data_type: ArrayDataType, target_data_type: ArrayDataType) -> Result {
    if let Some(nod) = nodata
        && !target_data_type.fits(nod)
    {
        return Err(Error::InvalidArgument(format!(
            "Trying to read a raster with native data type {source_data_type} into a buffer with data type {target_data_type}, but the rasters nodata value {nod} does not fit"
        )));
    }

    Ok(())
}
