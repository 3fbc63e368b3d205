use crate::{GeoTransform, RasterSize};

/// Represents the metadata associated with a raster band so it can be georeferenced.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoReference {
    /// The projection definition (WKT or proj string)
    projection: String,
    /// The size of the image in pixels
    size: RasterSize,
    /// The affine transformation
    geo_transform: GeoTransform,
    /// The nodata value
    nodata: Option<f64>,
}

impl GeoReference {
    pub fn new<S: Into<String>>(projection: S, size: RasterSize, geo_transform: GeoTransform, nodata: Option<f64>) -> Self {
        GeoReference {
            projection: projection.into(),
            size,
            geo_transform,
            nodata,
        }
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn raster_size(&self) -> RasterSize {
        self.size
    }

    pub fn geo_transform(&self) -> GeoTransform {
        self.geo_transform
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }
}
