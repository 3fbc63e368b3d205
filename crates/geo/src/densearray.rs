use crate::{ArrayNum, Cell, Error, RasterSize, Result};

/// Row-major two dimensional array of raster pixels.
/// Nodata cells are stored inline using the pixel value of the caller's choosing,
/// the array itself does not interpret any value as nodata.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray<T: ArrayNum> {
    size: RasterSize,
    data: Vec<T>,
}

impl<T: ArrayNum> DenseArray<T> {
    /// Wrap existing row-major data, the data length must match the cell count of the size.
    pub fn new(size: RasterSize, data: Vec<T>) -> Result<Self> {
        if data.len() != size.cell_count() {
            return Err(Error::InvalidArgument(format!(
                "Array data length {} does not match the array size {}",
                data.len(),
                size
            )));
        }

        Ok(DenseArray { size, data })
    }

    pub fn empty() -> Self {
        DenseArray {
            size: RasterSize::empty(),
            data: Vec::new(),
        }
    }

    pub fn filled_with(val: T, size: RasterSize) -> Self {
        DenseArray {
            size,
            data: vec![val; size.cell_count()],
        }
    }

    /// Create an array from f64 values, values that do not fit in `T` become `T::NODATA`
    pub fn from_f64_values(size: RasterSize, values: &[f64]) -> Result<Self> {
        Self::new(size, values.iter().map(|&v| T::from_f64_or_nodata(v)).collect())
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    pub fn columns(&self) -> usize {
        self.size.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// The pixels of a single row
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row >= self.size.rows {
            return None;
        }

        let start = row * self.size.cols;
        Some(&self.data[start..start + self.size.cols])
    }

    /// The value at the cell, `None` when the cell lies outside of the array
    pub fn cell_value(&self, cell: Cell) -> Option<T> {
        cell.index_in_raster(self.size).map(|idx| self.data[idx])
    }

    /// Set the value at the cell, returns false when the cell lies outside of the array
    pub fn set_cell_value(&mut self, cell: Cell, val: T) -> bool {
        match cell.index_in_raster(self.size) {
            Some(idx) => {
                self.data[idx] = val;
                true
            }
            None => false,
        }
    }

}

impl<T: ArrayNum> AsRef<[T]> for DenseArray<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T: ArrayNum> std::ops::Index<Cell> for DenseArray<T> {
    type Output = T;

    fn index(&self, cell: Cell) -> &Self::Output {
        &self.data[cell.row as usize * self.size.cols + cell.col as usize]
    }
}

impl<T: ArrayNum> std::ops::IndexMut<Cell> for DenseArray<T> {
    fn index_mut(&mut self, cell: Cell) -> &mut Self::Output {
        &mut self.data[cell.row as usize * self.size.cols + cell.col as usize]
    }
}

impl<'a, T: ArrayNum> IntoIterator for &'a DenseArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[cfg(test)]
#[generic_tests::define]
mod generictests {
    use crate::{Nodata, testutils::create_vec, testutils::NOD};

    use super::*;

    #[test]
    fn cell_access<T: ArrayNum>() {
        let size = RasterSize::with_rows_cols(2, 3);
        let mut arr = DenseArray::<T>::new(size, create_vec(&[1.0, 2.0, 3.0, 4.0, NOD, 6.0])).unwrap();

        assert_eq!(arr[Cell::from_row_col(1, 0)], T::from_f64_or_nodata(4.0));
        assert!(arr.cell_value(Cell::from_row_col(1, 1)).unwrap().is_nodata());
        assert_eq!(arr.cell_value(Cell::from_row_col(2, 0)), None);
        assert_eq!(arr.row(1).map(|r| r.len()), Some(3));
        assert!(arr.row(2).is_none());

        assert!(arr.set_cell_value(Cell::from_row_col(0, 2), T::from_f64_or_nodata(9.0)));
        assert!(!arr.set_cell_value(Cell::from_row_col(0, 3), T::zero()));
        assert_eq!(arr.as_slice()[2], T::from_f64_or_nodata(9.0));
    }

    #[test]
    fn size_must_match_data<T: ArrayNum>() {
        assert!(DenseArray::<T>::new(RasterSize::with_rows_cols(2, 2), vec![T::zero(); 3]).is_err());
        assert!(DenseArray::<T>::new(RasterSize::with_rows_cols(0, 2), Vec::new()).is_ok());
    }

    #[test]
    fn from_f64_values<T: ArrayNum>() {
        let arr = DenseArray::<T>::from_f64_values(RasterSize::square(2), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(arr, DenseArray::<T>::new(RasterSize::square(2), create_vec(&[1.0, 2.0, 3.0, 4.0])).unwrap());
        assert!(DenseArray::<T>::from_f64_values(RasterSize::square(2), &[1.0]).is_err());
    }

    #[instantiate_tests(<u8>)]
    mod u8 {}

    #[instantiate_tests(<i32>)]
    mod i32 {}

    #[instantiate_tests(<u32>)]
    mod u32 {}

    #[instantiate_tests(<f32>)]
    mod f32 {}

    #[instantiate_tests(<f64>)]
    mod f64 {}
}
