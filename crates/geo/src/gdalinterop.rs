use std::{
    ffi::{CStr, c_char, c_void},
    path::PathBuf,
};

use gdal::{errors::GdalError, raster::GdalType};

use crate::{ArrayDataType, Error, Result};

pub const FALSE: i32 = 0;

pub struct Config {
    pub debug_logging: bool,
    pub proj_db_search_location: Option<PathBuf>,
    pub config_options: Vec<(String, String)>,
}

impl Config {
    pub fn apply(&self) -> Result<()> {
        setup_logging(self.debug_logging);

        if let Some(proj_db_path) = &self.proj_db_search_location {
            let proj_db_path = proj_db_path.to_string_lossy().to_string();
            gdal::config::set_config_option("PROJ_DATA", proj_db_path.as_str())?;
        }

        for (key, value) in &self.config_options {
            log::debug!("GDAL config option {key}={value}");
            gdal::config::set_config_option(key, value)?;
        }

        Ok(())
    }
}

pub fn setup_logging(debug: bool) {
    if debug && gdal::config::set_config_option("CPL_DEBUG", "ON").is_err() {
        log::debug!("Failed to set GDAL debug level")
    }

    gdal::config::set_error_handler(|sev, _ec, msg| {
        use gdal::errors::CplErrType;
        match sev {
            CplErrType::Debug => log::debug!("GDAL: {msg}"),
            CplErrType::Warning => log::warn!("GDAL: {msg}"),
            CplErrType::Failure | CplErrType::Fatal => log::error!("GDAL: {msg}"),
            CplErrType::None => {}
        }
    });
}

/// The GDAL data type used for raster io buffers of the given type
pub fn gdal_ordinal_for_data_type(data_type: ArrayDataType) -> Result<gdal_sys::GDALDataType::Type> {
    Ok(match data_type {
        ArrayDataType::Uint8 => u8::gdal_ordinal(),
        ArrayDataType::Uint16 => u16::gdal_ordinal(),
        ArrayDataType::Int16 => i16::gdal_ordinal(),
        ArrayDataType::Uint32 => u32::gdal_ordinal(),
        ArrayDataType::Int32 => i32::gdal_ordinal(),
        ArrayDataType::Uint64 => u64::gdal_ordinal(),
        ArrayDataType::Int64 => i64::gdal_ordinal(),
        ArrayDataType::Float32 => f32::gdal_ordinal(),
        ArrayDataType::Float64 => f64::gdal_ordinal(),
        ArrayDataType::Int8 => {
            return Err(Error::InvalidArgument(
                "int8 buffers are not supported for GDAL raster io".to_string(),
            ));
        }
    })
}

pub fn check_rc(rc: gdal_sys::CPLErr::Type) -> std::result::Result<(), GdalError> {
    if rc != 0 {
        let msg = last_error_message();
        let last_err_no = unsafe { gdal_sys::CPLGetLastErrorNo() };
        Err(GdalError::CplError {
            class: rc,
            number: last_err_no,
            msg,
        })
    } else {
        Ok(())
    }
}

pub fn check_pointer<T>(ptr: *mut T, method_name: &'static str) -> std::result::Result<*mut T, GdalError> {
    if ptr.is_null() {
        let msg = last_error_message();
        unsafe { gdal_sys::CPLErrorReset() };
        Err(GdalError::NullPointer { method_name, msg })
    } else {
        Ok(ptr)
    }
}

pub(crate) fn data_ptr<T>(data: &[T]) -> *mut c_void {
    data.as_ptr().cast_mut().cast::<c_void>()
}

fn raw_string_to_string(raw_ptr: *const c_char) -> String {
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}

fn last_error_message() -> String {
    raw_string_to_string(unsafe { gdal_sys::CPLGetLastErrorMsg() })
}
