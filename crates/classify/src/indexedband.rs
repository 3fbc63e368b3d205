//! Sparse encoding of raster band blocks.
//!
//! [`encode`] keeps only the valid pixels of a block of bands: the coordinates of the valid pixels
//! in row-major scan order and a [`FeatureMatrix`] with one row per valid pixel and one column per band.
//! [`decode`] scatters a value per valid pixel back into a dense block using the same coordinates.

use geo::{ArrayNum, Cell, CellIterator, DenseArray, RasterSize};

use crate::{BandLayout, Error, FeatureMatrix, Result};

/// Coordinates of the valid pixels within a block, in row-major scan order
pub type ValidPixelIndex = Vec<Cell>;

/// Validity test of a reference band value
/// A NaN nodata value marks the NaN pixels as invalid, otherwise the value has to exceed the nodata value.
#[inline]
pub fn is_valid_pixel(value: f64, nodata: f64) -> bool {
    if nodata.is_nan() { !value.is_nan() } else { value > nodata }
}

/// Encode equally sized band blocks into the valid pixel index and the feature matrix.
/// Validity is decided on the first (reference) band only, the other bands are assumed to share its nodata footprint.
pub fn encode<T: ArrayNum>(band_blocks: &[DenseArray<T>], nodata: f64) -> Result<(ValidPixelIndex, FeatureMatrix)> {
    let Some(reference) = band_blocks.first() else {
        return Err(Error::Config("At least one band is required for encoding".to_string()));
    };

    let size = reference.size();
    if let Some(block) = band_blocks.iter().find(|block| block.size() != size) {
        return Err(Error::Raster(geo::Error::SizeMismatch {
            size1: size,
            size2: block.size(),
        }));
    }

    let mut index = ValidPixelIndex::new();
    let mut matrix = FeatureMatrix::with_columns(band_blocks.len());
    let mut row = vec![0.0; band_blocks.len()];

    for (cell, &value) in CellIterator::for_raster_with_size(size).zip(reference.iter()) {
        if !is_valid_pixel(value.to_f64_lossy(), nodata) {
            continue;
        }

        for (feature, block) in row.iter_mut().zip(band_blocks) {
            *feature = block[cell].to_f64_lossy();
        }

        matrix.push_row(&row)?;
        index.push(cell);
    }

    Ok((index, matrix))
}

/// Scatter the labels in a block of the given shape, cells that are not in the index contain the fill value.
/// The result does not depend on the order of the (index, label) pairs.
pub fn decode<L: ArrayNum>(index: &[Cell], labels: &[L], shape: RasterSize, fill: L) -> Result<DenseArray<L>> {
    if index.len() != labels.len() {
        return Err(Error::ShapeMismatch {
            index_len: index.len(),
            label_len: labels.len(),
        });
    }

    let mut output = DenseArray::filled_with(fill, shape);
    for (&cell, &label) in index.iter().zip(labels) {
        if !output.set_cell_value(cell, label) {
            return Err(Error::IndexOutOfBounds { cell, tile_size: shape });
        }
    }

    Ok(output)
}

/// Scatter every column of the feature matrix into its own block, the inverse of [`encode`].
pub fn decode_bands(index: &[Cell], matrix: &FeatureMatrix, shape: RasterSize, fill: f64) -> Result<Vec<DenseArray<f64>>> {
    let transposed;
    let band_rows = match matrix.layout() {
        BandLayout::BandRows => matrix,
        BandLayout::PixelRows => {
            transposed = matrix.transposed();
            &transposed
        }
    };

    band_rows.iter_rows().map(|band| decode(index, band, shape, fill)).collect()
}
