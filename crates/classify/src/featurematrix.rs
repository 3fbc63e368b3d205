use crate::{Error, Result};

/// Interpretation of the rows of a [`FeatureMatrix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandLayout {
    /// One row per valid pixel, one column per band (the layout classifiers expect)
    #[default]
    PixelRows,
    /// One row per band, one column per valid pixel
    BandRows,
}

/// Dense row-major matrix of feature values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    rows: usize,
    columns: usize,
    layout: BandLayout,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(rows: usize, columns: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * columns {
            return Err(Error::InvalidFeatureMatrix(format!(
                "{} values do not fill a {rows} x {columns} matrix",
                data.len()
            )));
        }

        Ok(FeatureMatrix {
            rows,
            columns,
            layout: BandLayout::PixelRows,
            data,
        })
    }

    /// Matrix in the pixel rows layout without rows
    pub fn with_columns(columns: usize) -> Self {
        FeatureMatrix {
            rows: 0,
            columns,
            layout: BandLayout::PixelRows,
            data: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: &[f64]) -> Result {
        if row.len() != self.columns {
            return Err(Error::InvalidFeatureMatrix(format!(
                "Row of length {} pushed on a matrix with {} columns",
                row.len(),
                self.columns
            )));
        }

        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    /// Append a column, the number of values must match the row count
    pub fn append_column(&mut self, values: &[f64]) -> Result {
        if values.len() != self.rows {
            return Err(Error::InvalidFeatureMatrix(format!(
                "Column of length {} appended to a matrix with {} rows",
                values.len(),
                self.rows
            )));
        }

        let mut data = Vec::with_capacity(self.rows * (self.columns + 1));
        for (row, &value) in values.iter().enumerate() {
            data.extend_from_slice(self.row(row));
            data.push(value);
        }

        self.data = data;
        self.columns += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn layout(&self) -> BandLayout {
        self.layout
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// The values of a row
    ///
    /// # Panics
    /// When the row index is out of range
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.columns..(row + 1) * self.columns]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(|row| self.row(row))
    }

    /// The values of a column, `None` when the column index is out of range
    pub fn column(&self, column: usize) -> Option<Vec<f64>> {
        if column >= self.columns {
            return None;
        }

        Some(self.iter_rows().map(|row| row[column]).collect())
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }

        Some(self.data[row * self.columns + column])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Swap rows and columns, this also switches the band layout
    pub fn transposed(&self) -> FeatureMatrix {
        let mut data = Vec::with_capacity(self.data.len());
        for column in 0..self.columns {
            data.extend(self.iter_rows().map(|row| row[column]));
        }

        FeatureMatrix {
            rows: self.columns,
            columns: self.rows,
            layout: match self.layout {
                BandLayout::PixelRows => BandLayout::BandRows,
                BandLayout::BandRows => BandLayout::PixelRows,
            },
            data,
        }
    }

}
