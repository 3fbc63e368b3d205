use crate::{ArrayDataType, Nodata};

// Type requirements for data in rasters
pub trait ArrayNum:
    Copy
    + Nodata
    + num::Num
    + num::NumCast
    + num::Bounded
    + std::cmp::PartialOrd
    + std::fmt::Debug
    + std::string::ToString
    + approx::AbsDiffEq<Epsilon = Self>
{
    const TYPE: ArrayDataType;
    const IS_SIGNED: bool;

    /// Convert a f64 value to this type, values that do not fit are mapped to `Self::NODATA`.
    #[inline]
    fn from_f64_or_nodata(value: f64) -> Self {
        inf::cast::value_or(value, Self::NODATA)
    }

    /// Lossy conversion to f64, used for feature values and statistics.
    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

macro_rules! impl_arraynum {
    ( $t:ident, $data_type:ident, $signed:literal ) => {
        impl ArrayNum for $t {
            const TYPE: ArrayDataType = ArrayDataType::$data_type;
            const IS_SIGNED: bool = $signed;
        }
    };
}

impl_arraynum!(i8, Int8, true);
impl_arraynum!(u8, Uint8, false);
impl_arraynum!(i16, Int16, true);
impl_arraynum!(u16, Uint16, false);
impl_arraynum!(i32, Int32, true);
impl_arraynum!(u32, Uint32, false);
impl_arraynum!(i64, Int64, true);
impl_arraynum!(u64, Uint64, false);
impl_arraynum!(f32, Float32, true);
impl_arraynum!(f64, Float64, true);
