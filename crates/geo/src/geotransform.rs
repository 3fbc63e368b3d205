use std::fmt::Debug;

use approx::{AbsDiffEq, RelativeEq};

/// Affine transformation from pixel coordinates to georeferenced coordinates.
#[derive(Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoTransform([f64; 6]);

impl GeoTransform {
    /// Creates a new `GeoTransform` from the provided coefficients.
    ///
    /// The coefficients are in the order: [top left x, pixel width, rotation (0 if north is up), top left y, rotation (0 if north is up), pixel height].
    pub const fn new(coefficients: [f64; 6]) -> Self {
        GeoTransform(coefficients)
    }

    pub const fn from_top_left_and_cell_size(top_left_x: f64, top_left_y: f64, cell_size_x: f64, cell_size_y: f64) -> Self {
        Self::new([top_left_x, cell_size_x, 0.0, top_left_y, 0.0, cell_size_y])
    }

    /// The horizontal cell size
    pub fn cell_size_x(&self) -> f64 {
        self.0[1]
    }

    /// The vertical cell size
    pub fn cell_size_y(&self) -> f64 {
        self.0[5]
    }

    /// Returns the coefficients of the transformation.
    pub fn coefficients(&self) -> [f64; 6] {
        self.0
    }
}

impl From<[f64; 6]> for GeoTransform {
    fn from(coefficients: [f64; 6]) -> Self {
        GeoTransform(coefficients)
    }
}

impl From<GeoTransform> for [f64; 6] {
    fn from(geo_trans: GeoTransform) -> [f64; 6] {
        geo_trans.0
    }
}

impl Debug for GeoTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GeoTransform(topleft: ({}, {}), pixel_width: {}, pixel_height: {})",
            self.0[0],
            self.0[3],
            self.cell_size_x(),
            self.cell_size_y()
        )
    }
}

impl AbsDiffEq for GeoTransform {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.0.abs_diff_eq(&other.0, epsilon)
    }
}

impl RelativeEq for GeoTransform {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.0.relative_eq(&other.0, epsilon, max_relative)
    }
}
