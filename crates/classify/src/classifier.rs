use crate::{FeatureMatrix, PredictionError};

/// Maps every row of a feature matrix (one valid pixel) to a label.
/// Implementations must return exactly one label per matrix row, in row order.
pub trait Classifier {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError>;
}

impl<F> Classifier for F
where
    F: Fn(&FeatureMatrix) -> Result<Vec<f64>, PredictionError>,
{
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError> {
        self(features)
    }
}

/// Half open `[min, max)` value range that maps to a label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRange {
    pub min: f64,
    pub max: f64,
    pub label: f64,
}

impl LabelRange {
    pub const fn new(min: f64, max: f64, label: f64) -> Self {
        LabelRange { min, max, label }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// Classifies pixels on the value of a single feature column.
/// The first matching range determines the label, unmatched values get the default label.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeClassifier {
    column: usize,
    ranges: Vec<LabelRange>,
    default_label: f64,
    expected_columns: Option<usize>,
}

impl RangeClassifier {
    pub fn new(column: usize, ranges: Vec<LabelRange>, default_label: f64) -> Self {
        RangeClassifier {
            column,
            ranges,
            default_label,
            expected_columns: None,
        }
    }

    /// Reject feature matrices that do not have exactly this number of columns
    pub fn with_expected_columns(mut self, columns: usize) -> Self {
        self.expected_columns = Some(columns);
        self
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn ranges(&self) -> &[LabelRange] {
        &self.ranges
    }

    fn label(&self, value: f64) -> f64 {
        self.ranges
            .iter()
            .find(|range| range.contains(value))
            .map_or(self.default_label, |range| range.label)
    }
}

impl Classifier for RangeClassifier {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError> {
        let expected = self.expected_columns.unwrap_or(features.columns());
        if features.columns() != expected || self.column >= features.columns() {
            return Err(PredictionError::ColumnCount {
                expected: expected.max(self.column.saturating_add(1)),
                actual: features.columns(),
            });
        }

        features
            .iter_rows()
            .enumerate()
            .map(|(row, values)| {
                let value = values[self.column];
                if !value.is_finite() {
                    return Err(PredictionError::NonFiniteValue { row, column: self.column });
                }

                Ok(self.label(value))
            })
            .collect()
    }
}
