use std::{
    io::{BufWriter, Write},
    ops::Range,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use ndarray::Array2;
use tracing::debug;

use super::{concat_rows, with_dataset};
use crate::{Error, Result};

const F64_BYTES: usize = std::mem::size_of::<f64>();

/// How a worker process is started.
///
/// A worker runs `program args.. --file <path> --dataset <name> --start <row> --end <row>`,
/// reads that row range on its own file handle and writes it to stdout with
/// [`write_rows`]. The `benchmark` binary serves this as its hidden `read-rows` subcommand.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl WorkerCommand {
    pub fn new(
        program: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        WorkerCommand {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn command(&self, path: &Path, dataset: &str, rows: &Range<usize>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--file")
            .arg(path)
            .arg("--dataset")
            .arg(dataset)
            .arg("--start")
            .arg(rows.start.to_string())
            .arg("--end")
            .arg(rows.end.to_string());
        cmd
    }
}

/// Split `0..rows` into at most `workers` contiguous blocks of `ceil(rows / workers)` rows.
///
/// The last block ends at `rows` and may be shorter. Empty blocks are never produced,
/// so fewer than `workers` blocks come back when `rows < workers`.
pub fn rows_partition(rows: usize, workers: usize) -> Vec<Range<usize>> {
    if rows == 0 || workers == 0 {
        return Vec::new();
    }
    let block = rows.div_ceil(workers);
    (0..rows)
        .step_by(block)
        .map(|start| start..(start + block).min(rows))
        .collect()
}

/// Fan the row blocks out to a pool of at most `workers` worker processes.
///
/// The shape is read up front and that handle is closed before any worker starts.
/// Each worker opens the file on its own. Blocks are stacked in submission order,
/// and the first failing worker fails the read.
pub(crate) fn read(
    path: &Path,
    dataset: &str,
    workers: usize,
    worker: Option<&WorkerCommand>,
) -> Result<Array2<f64>> {
    if workers == 0 {
        return Err(Error::InvalidParameter("workers must be greater than zero"));
    }
    let worker = worker.ok_or(Error::InvalidParameter(
        "parallel reads need a worker command",
    ))?;
    let (rows, cols) = with_dataset(path, dataset, |_, shape| Ok(shape))?;
    let ranges = rows_partition(rows, workers);

    // one blocking thread waits on each child
    let rt = tokio::runtime::Builder::new_current_thread()
        .max_blocking_threads(workers)
        .thread_name("read-worker")
        .build()?;
    let blocks = rt.block_on(async {
        let handles: Vec<_> = ranges
            .into_iter()
            .enumerate()
            .map(|(id, range)| {
                let mut cmd = worker.command(path, dataset, &range);
                tokio::task::spawn_blocking(move || {
                    debug!(worker = id, ?range, "spawning read worker");
                    let output = cmd.output()?;
                    block_from_output(id, &output, range.len(), cols)
                })
            })
            .collect();
        let mut blocks = Vec::with_capacity(handles.len());
        for handle in handles {
            blocks.push(handle.await??);
        }
        Ok::<_, Error>(blocks)
    })?;
    concat_rows(blocks, cols)
}

fn block_from_output(
    worker: usize,
    output: &Output,
    rows: usize,
    cols: usize,
) -> Result<Array2<f64>> {
    if !output.status.success() {
        return Err(Error::Worker {
            worker,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    decode_rows(&output.stdout, rows, cols)
}

/// Read `rows` of `dataset` and write them to `out` as row-major little-endian `f64`s.
pub fn write_rows(path: &Path, dataset: &str, rows: Range<usize>, out: impl Write) -> Result<()> {
    let block = with_dataset(path, dataset, |ds, _| {
        Ok(ds.read_slice_2d::<f64, _>((rows, ..))?)
    })?;
    let mut out = BufWriter::new(out);
    for value in block.iter() {
        out.write_all(&value.to_le_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn decode_rows(bytes: &[u8], rows: usize, cols: usize) -> Result<Array2<f64>> {
    let expected = rows * cols * F64_BYTES;
    if bytes.len() != expected {
        return Err(Error::MalformedBlock {
            expected,
            actual: bytes.len(),
        });
    }
    let values = bytes
        .chunks_exact(F64_BYTES)
        .map(|chunk| {
            let mut le = [0u8; F64_BYTES];
            le.copy_from_slice(chunk);
            f64::from_le_bytes(le)
        })
        .collect();
    Ok(Array2::from_shape_vec((rows, cols), values)?)
}
