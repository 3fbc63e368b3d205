//! Normalized difference index features, `(A - B) / (A + B)` for a pair of bands.

use crate::{BandLayout, Error, FeatureMatrix, Result};

/// Pair of 1-based band numbers
pub type BandPair = (usize, usize);

/// Every unordered band pair `(a, b)` with `a < b`, band numbers are 1-based
pub fn all_band_combinations(band_count: usize) -> Vec<BandPair> {
    (1..=band_count)
        .flat_map(|a| (a + 1..=band_count).map(move |b| (a, b)))
        .collect()
}

/// The normalized difference of two values, 0 when the values sum to 0
#[inline]
pub fn normalized_difference(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum == 0.0 { 0.0 } else { (a - b) / sum }
}

/// Append a normalized difference column to the matrix for every band pair.
/// The band numbers refer to the existing matrix columns (1-based).
pub fn append_normalized_differences(matrix: &mut FeatureMatrix, pairs: &[BandPair]) -> Result {
    if matrix.layout() != BandLayout::PixelRows {
        return Err(Error::Config("Normalized differences require a matrix with one row per pixel".to_string()));
    }

    let band_count = matrix.columns();
    for &(a, b) in pairs {
        if a == 0 || b == 0 || a > band_count || b > band_count {
            return Err(Error::Config(format!(
                "Band combination ({a}, {b}) refers to a band outside of the {band_count} available bands"
            )));
        }
    }

    for &(a, b) in pairs {
        let column: Vec<f64> = matrix
            .iter_rows()
            .map(|row| normalized_difference(row[a - 1], row[b - 1]))
            .collect();
        matrix.append_column(&column)?;
    }

    Ok(())
}

/// Parse a band pair in the form `a,b`
pub fn parse_band_pair(s: &str) -> Result<BandPair> {
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|err| Error::Config(format!("Invalid band combination '{s}': {err}")))
    };

    match s.split_once(',') {
        Some((a, b)) => Ok((parse(a)?, parse(b)?)),
        None => Err(Error::Config(format!("Invalid band combination '{s}', expected 'a,b'"))),
    }
}
