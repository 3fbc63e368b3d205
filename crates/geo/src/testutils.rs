use approx::relative_eq;

use crate::{ArrayNum, GeoReference, GeoTransform, RasterSize};

pub const NOD: f64 = 255.0;

pub fn create_vec<T: ArrayNum>(data: &[f64]) -> Vec<T> {
    data.iter()
        .map(|&v| {
            if relative_eq!(v, NOD) {
                T::NODATA
            } else {
                num::NumCast::from(v).expect("f64 could not be converted to the specified type")
            }
        })
        .collect()
}

pub fn compare_fp_vectors(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(a, b)| {
            if a.is_nan() || b.is_nan() {
                return a.is_nan() == b.is_nan();
            }

            relative_eq!(a, b)
        })
}

#[allow(dead_code)]
pub fn test_georeference(size: RasterSize) -> GeoReference {
    GeoReference::new(
        "EPSG:31370",
        size,
        GeoTransform::from_top_left_and_cell_size(22000.0, 245000.0, 100.0, -100.0),
        Some(NOD),
    )
}

#[cfg(feature = "gdal")]
pub fn configure_gdal() {
    use crate::gdalinterop;

    let gdal_config = gdalinterop::Config {
        debug_logging: false,
        proj_db_search_location: None,
        config_options: Vec::default(),
    };

    gdal_config.apply().expect("Failed to configure GDAL");
}
