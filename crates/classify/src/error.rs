use geo::Window;
use thiserror::Error;

/// Failure reported by a [`crate::Classifier`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Expected {expected} feature columns, got {actual}")]
    ColumnCount { expected: usize, actual: usize },
    #[error("Non finite feature value in row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },
    #[error("{0}")]
    Model(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to describe raster: {0}")]
    Describe(#[source] geo::Error),
    #[error("Index length {index_len} does not match label length {label_len}")]
    ShapeMismatch { index_len: usize, label_len: usize },
    #[error("Index cell {cell} is outside of the tile {tile_size}")]
    IndexOutOfBounds { cell: geo::Cell, tile_size: geo::RasterSize },
    #[error("Invalid feature matrix: {0}")]
    InvalidFeatureMatrix(String),
    #[error("Raster band count changed during the run: expected {expected}, got {actual}")]
    BandCountChanged { expected: usize, actual: usize },
    #[error("Prediction failed for tile {window} ({rows} x {cols} features): {source}")]
    Prediction {
        window: Window,
        rows: usize,
        cols: usize,
        #[source]
        source: PredictionError,
    },
    #[error("Failed to read tile {window}: {source}")]
    Read {
        window: Window,
        #[source]
        source: geo::Error,
    },
    #[error("Failed to write tile {window}: {source}")]
    Write {
        window: Window,
        #[source]
        source: geo::Error,
    },
    #[error(transparent)]
    Raster(#[from] geo::Error),
}
