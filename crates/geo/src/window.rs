use crate::RasterSize;

/// Rectangular region of a raster in pixel coordinates.
/// `x_offset` is the column and `y_offset` the row of the top left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub x_offset: usize,
    pub y_offset: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub const fn new(x_offset: usize, y_offset: usize, width: usize, height: usize) -> Self {
        Window {
            x_offset,
            y_offset,
            width,
            height,
        }
    }

    /// Window that spans the full extent of a raster with the given size
    pub const fn covering(size: RasterSize) -> Self {
        Window::new(0, 0, size.cols, size.rows)
    }

    /// The size of the window as a raster size, a window of width `w` has `w` columns
    pub const fn size(&self) -> RasterSize {
        RasterSize::with_rows_cols(self.height, self.width)
    }

    pub const fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check that the window does not exceed the extent of a raster with the given size
    pub fn is_contained_in(&self, size: RasterSize) -> bool {
        match (self.x_offset.checked_add(self.width), self.y_offset.checked_add(self.height)) {
            (Some(right), Some(bottom)) => right <= size.cols && bottom <= size.rows,
            _ => false,
        }
    }

}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(x: {}, y: {}, width: {}, height: {})", self.x_offset, self.y_offset, self.width, self.height)
    }
}
