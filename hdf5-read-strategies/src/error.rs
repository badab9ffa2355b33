use std::path::PathBuf;

use crate::strategies::Strategy;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("hdf5: {0}")]
    Hdf5(#[from] hdf5::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("array shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("read worker panicked: {0}")]
    WorkerPanicked(#[from] tokio::task::JoinError),
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("dataset {dataset:?} in {path:?} has rank {rank}, expected 2")]
    UnexpectedRank {
        path: PathBuf,
        dataset: String,
        rank: usize,
    },
    #[error("dataset {dataset:?} in {path:?} does not hold f64 values")]
    UnexpectedDtype { path: PathBuf, dataset: String },
    #[error("column {column} out of bounds for dataset with {cols} columns")]
    ColumnOutOfBounds { column: usize, cols: usize },
    #[error("{strategy} read does not match the basic read of {dataset:?} in {path:?}")]
    ValidationFailed {
        strategy: Strategy,
        path: PathBuf,
        dataset: String,
    },
    #[error("measurement subprocess failed ({status}): {stderr}")]
    Subprocess { status: String, stderr: String },
    #[error("measurement subprocess returned a {actual} measurement, expected {expected}")]
    MeasurementMismatch { expected: Strategy, actual: Strategy },
    #[error("read worker {worker} failed ({status}): {stderr}")]
    Worker {
        worker: usize,
        status: String,
        stderr: String,
    },
    #[error("read worker sent {actual} bytes, expected {expected}")]
    MalformedBlock { expected: usize, actual: usize },
    #[error("progress bar template: {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
}
