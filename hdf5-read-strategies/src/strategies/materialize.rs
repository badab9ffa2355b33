use std::path::Path;

use ndarray::{Array2, Ix2};

use super::with_dataset;
use crate::Result;

/// Materialize the dataset through the dynamic-rank path, then fix the rank.
/// This is a plain in-memory copy; HDF5 is not asked to map anything.
pub(crate) fn read(path: &Path, dataset: &str) -> Result<Array2<f64>> {
    with_dataset(path, dataset, |ds, (rows, cols)| {
        if rows == 0 {
            return Ok(Array2::zeros((0, cols)));
        }
        let data = ds.read_dyn::<f64>()?;
        Ok(data.into_dimensionality::<Ix2>()?)
    })
}
