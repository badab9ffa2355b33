use std::{ops::Range, path::Path};

use ndarray::{Array2, ArrayView2, Axis};

use super::with_dataset;
use crate::{Error, Result};

/// Read only `columns`, in the order given. `None` or an empty subset reads everything.
///
/// Adjacent ascending columns are fetched as one hyperslab, so `[0, 1, 2, 7]`
/// costs two reads rather than four.
pub(crate) fn read(path: &Path, dataset: &str, columns: Option<&[usize]>) -> Result<Array2<f64>> {
    with_dataset(path, dataset, |ds, (rows, cols)| {
        let columns = match columns {
            Some(columns) if !columns.is_empty() => columns,
            _ => {
                if rows == 0 {
                    return Ok(Array2::zeros((0, cols)));
                }
                return Ok(ds.read_2d::<f64>()?);
            }
        };
        if let Some(&column) = columns.iter().find(|&&c| c >= cols) {
            return Err(Error::ColumnOutOfBounds { column, cols });
        }
        if rows == 0 {
            return Ok(Array2::zeros((0, columns.len())));
        }
        let parts = column_runs(columns)
            .into_iter()
            .map(|run| ds.read_slice_2d::<f64, _>((.., run)))
            .collect::<hdf5::Result<Vec<_>>>()?;
        let views: Vec<ArrayView2<f64>> = parts.iter().map(|p| p.view()).collect();
        Ok(ndarray::concatenate(Axis(1), &views)?)
    })
}

/// Coalesce a column list into contiguous runs, preserving order.
pub(crate) fn column_runs(columns: &[usize]) -> Vec<Range<usize>> {
    let mut runs: Vec<Range<usize>> = Vec::new();
    for &column in columns {
        match runs.last_mut() {
            Some(run) if run.end == column => run.end += 1,
            _ => runs.push(column..column + 1),
        }
    }
    runs
}
