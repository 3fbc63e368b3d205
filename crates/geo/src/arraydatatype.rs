use crate::{Error, Nodata};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ArrayDataType {
    Int8 = 0,
    Uint8 = 1,
    Int16 = 2,
    Uint16 = 3,
    Int32 = 4,
    Uint32 = 5,
    Int64 = 6,
    Uint64 = 7,
    Float32 = 8,
    Float64 = 9,
}

impl ArrayDataType {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// The size of a single pixel of this type in bytes
    pub const fn bytes(&self) -> u32 {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    pub const fn is_floating_point(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub const fn is_signed(&self) -> bool {
        !matches!(self, Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64)
    }

    /// The nodata value that is used for this type when the raster does not define one.
    pub fn default_nodata_value(&self) -> f64 {
        match self {
            Self::Int8 => i8::NODATA as f64,
            Self::Uint8 => u8::NODATA as f64,
            Self::Int16 => i16::NODATA as f64,
            Self::Uint16 => u16::NODATA as f64,
            Self::Int32 => i32::NODATA as f64,
            Self::Uint32 => u32::NODATA as f64,
            Self::Int64 => i64::NODATA as f64,
            Self::Uint64 => u64::NODATA as f64,
            Self::Float32 => f32::NODATA as f64,
            Self::Float64 => f64::NODATA,
        }
    }

    /// Check if the provided value can be represented by this type without overflowing.
    pub fn fits(&self, value: f64) -> bool {
        if value.is_nan() {
            return self.is_floating_point();
        }

        match self {
            Self::Uint8 => inf::cast::fits_in_type::<u8>(value),
            Self::Uint16 => inf::cast::fits_in_type::<u16>(value),
            Self::Uint32 => inf::cast::fits_in_type::<u32>(value),
            Self::Uint64 => inf::cast::fits_in_type::<u64>(value),
            Self::Int8 => inf::cast::fits_in_type::<i8>(value),
            Self::Int16 => inf::cast::fits_in_type::<i16>(value),
            Self::Int32 => inf::cast::fits_in_type::<i32>(value),
            Self::Int64 => inf::cast::fits_in_type::<i64>(value),
            Self::Float32 => inf::cast::fits_in_type::<f32>(value),
            Self::Float64 => true,
        }
    }
}

impl std::fmt::Display for ArrayDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl std::str::FromStr for ArrayDataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "int8" => Ok(Self::Int8),
            "uint8" | "byte" => Ok(Self::Uint8),
            "int16" => Ok(Self::Int16),
            "uint16" => Ok(Self::Uint16),
            "int32" => Ok(Self::Int32),
            "uint32" => Ok(Self::Uint32),
            "int64" => Ok(Self::Int64),
            "uint64" => Ok(Self::Uint64),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            _ => Err(Error::InvalidArgument(format!("Unknown data type: {s}"))),
        }
    }
}
