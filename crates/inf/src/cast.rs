use num::NumCast;

/// Check if a f64 value fits in a given numerical type.
pub fn fits_in_type<T: NumCast>(v: f64) -> bool {
    let x: Option<T> = NumCast::from(v);
    x.is_some()
}

/// Cast a value to the requested type, returns the fallback value when the value does not fit.
pub fn value_or<To: NumCast>(from: impl NumCast, fallback: To) -> To {
    NumCast::from(from).unwrap_or(fallback)
}
