use num::ToPrimitive;

/// Trait for types that can represent a no-data value in raster data.
/// Floating point types use NaN as the no-data value, integer types use their maximum value for unsigned types
/// and minimum value for signed types.
pub trait Nodata: ToPrimitive + PartialEq + Sized + Copy {
    const NODATA: Self;

    #[inline]
    fn is_nodata(self) -> bool {
        self == Self::NODATA
    }

    /// For importing foreign data that may contain nodata values not adhering to the predefined `Self::NODATA` value.
    fn init_nodata(&mut self, nodata: Self) {
        if *self == nodata {
            *self = Self::NODATA;
        }
    }

    /// For exporting the data to a format where the nodata value does not match the predefined `Self::NODATA` value.
    fn restore_nodata(&mut self, nodata: Self) {
        if self.is_nodata() {
            *self = nodata;
        }
    }

    fn has_nan() -> bool;
}

macro_rules! impl_nodata_fixed_point {
    ( $t:ident, $nodata:ident ) => {
        impl Nodata for $t {
            const NODATA: $t = $t::$nodata;

            fn has_nan() -> bool {
                false
            }
        }
    };
}

macro_rules! impl_nodata_floating_point {
    ( $t:ident ) => {
        impl Nodata for $t {
            const NODATA: $t = $t::NAN;

            fn is_nodata(self) -> bool {
                self.is_nan()
            }

            fn has_nan() -> bool {
                true
            }
        }
    };
}

impl_nodata_fixed_point!(u8, MAX);
impl_nodata_fixed_point!(u16, MAX);
impl_nodata_fixed_point!(u32, MAX);
impl_nodata_fixed_point!(u64, MAX);
impl_nodata_fixed_point!(i8, MIN);
impl_nodata_fixed_point!(i16, MIN);
impl_nodata_fixed_point!(i32, MIN);
impl_nodata_fixed_point!(i64, MIN);

impl_nodata_floating_point!(f32);
impl_nodata_floating_point!(f64);
