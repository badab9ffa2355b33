use std::path::Path;

use ndarray::Array2;

use super::with_dataset;
use crate::Result;

/// The whole dataset in one read call.
pub(crate) fn read(path: &Path, dataset: &str) -> Result<Array2<f64>> {
    with_dataset(path, dataset, |ds, (rows, cols)| {
        if rows == 0 {
            return Ok(Array2::zeros((0, cols)));
        }
        Ok(ds.read_2d::<f64>()?)
    })
}
