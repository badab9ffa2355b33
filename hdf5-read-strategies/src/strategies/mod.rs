//! The five ways of reading a 2-D `f64` dataset out of an HDF5 file.
//!
//! Every strategy opens its own read-only file handle and returns the rows it
//! read as an owned [`Array2`]. [`Strategy::Parallel`] hands its row blocks to
//! worker processes, each with a handle of its own. For the same dataset (and,
//! for [`Strategy::Selective`], no column subset) all strategies return the same array.

use std::{fmt, path::Path, str::FromStr};

use ndarray::{Array2, ArrayView2, Axis};

use crate::{Error, Result};

mod basic;
mod chunked;
mod materialize;
mod parallel;
mod selective;

#[cfg(test)]
mod tests;

pub use parallel::{rows_partition, write_rows, WorkerCommand};

pub const DEFAULT_CHUNK_ROWS: usize = 10_000;
pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Strategy {
    Basic,
    Chunked,
    /// Materializes the whole dataset through the dynamic-rank read path.
    /// Despite the name nothing is memory-mapped.
    #[serde(rename = "Memory Map")]
    MemoryMap,
    Parallel,
    Selective,
}

impl Strategy {
    /// Report order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Basic,
        Strategy::Chunked,
        Strategy::MemoryMap,
        Strategy::Parallel,
        Strategy::Selective,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Basic => "Basic",
            Strategy::Chunked => "Chunked",
            Strategy::MemoryMap => "Memory Map",
            Strategy::Parallel => "Parallel",
            Strategy::Selective => "Selective",
        }
    }

    pub fn cli_name(&self) -> &'static str {
        match self {
            Strategy::Basic => "basic",
            Strategy::Chunked => "chunked",
            Strategy::MemoryMap => "memory-map",
            Strategy::Parallel => "parallel",
            Strategy::Selective => "selective",
        }
    }

    pub fn read(&self, path: &Path, dataset: &str, params: &StrategyParams) -> Result<Array2<f64>> {
        match self {
            Strategy::Basic => basic::read(path, dataset),
            Strategy::Chunked => chunked::read(path, dataset, params.chunk_rows),
            Strategy::MemoryMap => materialize::read(path, dataset),
            Strategy::Parallel => {
                parallel::read(path, dataset, params.workers, params.worker.as_ref())
            }
            Strategy::Selective => selective::read(path, dataset, params.columns.as_deref()),
        }
    }

    /// Project a full read onto what this strategy returns under `params`.
    pub fn expected_from_full(&self, full: &Array2<f64>, params: &StrategyParams) -> Array2<f64> {
        match (self, params.columns.as_deref()) {
            (Strategy::Selective, Some(columns)) if !columns.is_empty() => {
                full.select(Axis(1), columns)
            }
            _ => full.clone(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.cli_name() == s || strategy.name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown strategy {s:?}, expected one of: {}",
                    itertools::join(Strategy::ALL.iter().map(|s| s.cli_name()), ", ")
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StrategyParams {
    /// Rows per window for [`Strategy::Chunked`].
    pub chunk_rows: usize,
    /// Pool size for [`Strategy::Parallel`].
    pub workers: usize,
    /// Column subset for [`Strategy::Selective`]. `None` or empty reads every column.
    pub columns: Option<Vec<usize>>,
    /// Worker process for [`Strategy::Parallel`], which fails without one.
    pub worker: Option<WorkerCommand>,
}

impl StrategyParams {
    pub fn with_worker(mut self, worker: WorkerCommand) -> Self {
        self.worker = Some(worker);
        self
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            chunk_rows: DEFAULT_CHUNK_ROWS,
            workers: DEFAULT_WORKERS,
            columns: None,
            worker: None,
        }
    }
}

/// Open `dataset` in `path` read-only, check it is a 2-D `f64` array and hand it to `f`
/// together with its `(rows, cols)` shape. The file stays open for the duration of `f`.
pub(crate) fn with_dataset<T>(
    path: &Path,
    dataset: &str,
    f: impl FnOnce(&hdf5::Dataset, (usize, usize)) -> Result<T>,
) -> Result<T> {
    let file = hdf5::File::open(path)?;
    let ds = file.dataset(dataset)?;
    let shape = ds.shape();
    let &[rows, cols] = shape.as_slice() else {
        return Err(Error::UnexpectedRank {
            path: path.to_owned(),
            dataset: dataset.to_owned(),
            rank: shape.len(),
        });
    };
    if !ds.dtype()?.is::<f64>() {
        return Err(Error::UnexpectedDtype {
            path: path.to_owned(),
            dataset: dataset.to_owned(),
        });
    }
    f(&ds, (rows, cols))
}

/// Stack row blocks in order. No blocks means an empty `(0, cols)` array.
pub(crate) fn concat_rows(mut blocks: Vec<Array2<f64>>, cols: usize) -> Result<Array2<f64>> {
    match blocks.len() {
        0 => Ok(Array2::zeros((0, cols))),
        1 => Ok(blocks.swap_remove(0)),
        _ => {
            let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
            Ok(ndarray::concatenate(Axis(0), &views)?)
        }
    }
}
