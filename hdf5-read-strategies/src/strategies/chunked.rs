use std::path::Path;

use ndarray::Array2;
use tracing::trace;

use super::{concat_rows, with_dataset};
use crate::{Error, Result};

/// Read `chunk_rows` rows at a time and stack the windows. The last window may be short.
pub(crate) fn read(path: &Path, dataset: &str, chunk_rows: usize) -> Result<Array2<f64>> {
    if chunk_rows == 0 {
        return Err(Error::InvalidParameter("chunk_rows must be greater than zero"));
    }
    with_dataset(path, dataset, |ds, (rows, cols)| {
        let mut windows = Vec::with_capacity(rows.div_ceil(chunk_rows));
        for start in (0..rows).step_by(chunk_rows) {
            let end = (start + chunk_rows).min(rows);
            trace!(start, end, "reading window");
            windows.push(ds.read_slice_2d::<f64, _>((start..end, ..))?);
        }
        concat_rows(windows, cols)
    })
}
