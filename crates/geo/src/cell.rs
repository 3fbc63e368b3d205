use crate::RasterSize;

/// Represents a point in the raster using row, col coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn from_row_col(row: i32, col: i32) -> Self {
        Cell { row, col }
    }

    pub const fn invalid() -> Self {
        Cell { row: -1, col: -1 }
    }

    pub const fn is_valid(&self) -> bool {
        self.row >= 0 && self.col >= 0
    }

    pub fn increment(&mut self, cols_in_grid: i32) {
        self.col += 1;
        if self.col >= cols_in_grid {
            self.col = 0;
            self.row += 1;
        }
    }

    /// Check if the cell lies within a raster of the given size
    pub fn is_in(&self, size: RasterSize) -> bool {
        self.is_valid() && (self.row as usize) < size.rows && (self.col as usize) < size.cols
    }

    /// The row-major offset of the cell in a raster of the given size.
    /// Returns `None` when the cell lies outside of the raster.
    pub fn index_in_raster(&self, size: RasterSize) -> Option<usize> {
        if !self.is_in(size) {
            return None;
        }

        Some(self.row as usize * size.cols + self.col as usize)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

/// Iterator over the cells in a raster
/// Iteration will occur from the top-left cell to the bottom-right cell in row-major order.
pub struct CellIterator {
    rows: i32,
    cols: i32,
    current: Cell,
}

impl CellIterator {
    pub fn for_raster_with_size(size: RasterSize) -> Self {
        CellIterator {
            rows: size.rows as i32,
            cols: size.cols as i32,
            current: Cell::from_row_col(0, 0),
        }
    }
}

impl Iterator for CellIterator {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cols == 0 || self.current.row >= self.rows {
            return None;
        }

        let current = self.current;
        self.current.increment(self.cols);
        Some(current)
    }
}
