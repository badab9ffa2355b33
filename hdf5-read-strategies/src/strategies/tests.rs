use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Axis};

use super::{rows_partition, selective::column_runs, Strategy, StrategyParams, WorkerCommand};
use crate::Error;

const DATASET: &str = "data";

/// Write a `rows x cols` dataset whose values encode their position.
fn write_fixture(dir: &Path, rows: usize, cols: usize) -> (PathBuf, Array2<f64>) {
    let path = dir.join(format!("fixture_{rows}x{cols}.h5"));
    let data = Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64 + 0.5);
    let file = hdf5::File::create(&path).unwrap();
    let ds = file
        .new_dataset::<f64>()
        .shape((rows, cols))
        .create(DATASET)
        .unwrap();
    if rows > 0 {
        ds.write(&data).unwrap();
    }
    (path, data)
}

/// Never started: every Parallel case here fails or finishes before a worker would run.
/// Reads through real workers are in benchmark/tests/parallel.rs.
fn unspawnable_worker() -> WorkerCommand {
    WorkerCommand::new("/nonexistent/read-worker", Vec::<String>::new())
}

fn params(chunk_rows: usize, workers: usize, columns: Option<Vec<usize>>) -> StrategyParams {
    StrategyParams {
        chunk_rows,
        workers,
        columns,
        worker: Some(unspawnable_worker()),
    }
}

fn in_process_strategies() -> impl Iterator<Item = Strategy> {
    Strategy::ALL
        .into_iter()
        .filter(|s| *s != Strategy::Parallel)
}

#[test]
fn in_process_strategies_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (path, written) = write_fixture(dir.path(), 1003, 7);
    let params = params(100, 4, None);
    for strategy in in_process_strategies() {
        let read = strategy.read(&path, DATASET, &params).unwrap();
        assert_eq!(read, written, "{strategy}");
    }
}

#[test]
fn chunked_length_matches_whether_or_not_chunks_divide_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (path, written) = write_fixture(dir.path(), 1000, 3);
    for chunk_rows in [1, 7, 100, 333, 999, 1000, 1001, 10_000] {
        let read = Strategy::Chunked
            .read(&path, DATASET, &params(chunk_rows, 4, None))
            .unwrap();
        assert_eq!(read.nrows(), 1000, "chunk_rows={chunk_rows}");
        assert_eq!(read, written, "chunk_rows={chunk_rows}");
    }
}

#[test]
fn zero_chunk_rows_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_fixture(dir.path(), 10, 2);
    let err = Strategy::Chunked
        .read(&path, DATASET, &params(0, 4, None))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)), "{err:?}");
}

#[test]
fn rows_partition_boundaries() {
    assert_eq!(rows_partition(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
    assert_eq!(rows_partition(10, 4), vec![0..3, 3..6, 6..9, 9..10]);
    assert_eq!(rows_partition(3, 4), vec![0..1, 1..2, 2..3]);
    assert_eq!(rows_partition(1, 1), vec![0..1]);
    assert!(rows_partition(0, 4).is_empty());
    assert!(rows_partition(5, 0).is_empty());
}

#[test]
fn rows_partition_covers_every_row() {
    for rows in [1, 2, 9, 10, 11, 97, 1000, 1_000_001] {
        for workers in 1..=9 {
            let blocks = rows_partition(rows, workers);
            assert!(blocks.len() <= workers, "rows={rows} workers={workers}");
            assert_eq!(blocks.first().map(|b| b.start), Some(0));
            assert_eq!(blocks.last().map(|b| b.end), Some(rows));
            for pair in blocks.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            assert!(blocks.iter().all(|b| !b.is_empty()));
        }
    }
}

#[test]
fn zero_workers_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_fixture(dir.path(), 10, 2);
    let err = Strategy::Parallel
        .read(&path, DATASET, &params(10, 0, None))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)), "{err:?}");
}

#[test]
fn parallel_needs_a_worker_command() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_fixture(dir.path(), 10, 2);
    let err = Strategy::Parallel
        .read(&path, DATASET, &StrategyParams::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)), "{err:?}");
}

#[test]
fn parallel_worker_that_cannot_start_fails_the_read() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_fixture(dir.path(), 10, 2);
    let err = Strategy::Parallel
        .read(&path, DATASET, &params(10, 2, None))
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err:?}");
}

#[test]
fn selective_reads_requested_columns_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (path, written) = write_fixture(dir.path(), 250, 10);
    let columns = vec![5, 0, 1, 2, 9, 9];
    let read = Strategy::Selective
        .read(&path, DATASET, &params(100, 4, Some(columns.clone())))
        .unwrap();
    assert_eq!(read.dim(), (250, columns.len()));
    assert_eq!(read, written.select(Axis(1), &columns));
    for (i, &column) in columns.iter().enumerate() {
        assert_eq!(read.column(i), written.column(column));
    }
}

#[test]
fn selective_without_columns_is_a_full_read() {
    let dir = tempfile::tempdir().unwrap();
    let (path, written) = write_fixture(dir.path(), 20, 3);
    for columns in [None, Some(vec![])] {
        let read = Strategy::Selective
            .read(&path, DATASET, &params(100, 4, columns))
            .unwrap();
        assert_eq!(read, written);
    }
}

#[test]
fn selective_rejects_out_of_bounds_column() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_fixture(dir.path(), 20, 3);
    let err = Strategy::Selective
        .read(&path, DATASET, &params(100, 4, Some(vec![0, 3])))
        .unwrap_err();
    assert!(
        matches!(err, Error::ColumnOutOfBounds { column: 3, cols: 3 }),
        "{err:?}"
    );
}

#[test]
fn column_runs_coalesce_adjacent_columns() {
    assert_eq!(column_runs(&[0, 1, 2, 7]), vec![0..3, 7..8]);
    assert_eq!(column_runs(&[3, 2, 1]), vec![3..4, 2..3, 1..2]);
    assert_eq!(column_runs(&[4, 4]), vec![4..5, 4..5]);
    assert!(column_runs(&[]).is_empty());
}

#[test]
fn empty_dataset_reads_as_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_fixture(dir.path(), 0, 6);
    for strategy in Strategy::ALL {
        let read = strategy
            .read(&path, DATASET, &params(10, 4, None))
            .unwrap();
        assert_eq!(read.dim(), (0, 6), "{strategy}");
    }
    let read = Strategy::Selective
        .read(&path, DATASET, &params(10, 4, Some(vec![1, 2])))
        .unwrap();
    assert_eq!(read.dim(), (0, 2));
}

#[test]
fn missing_file_and_dataset_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _) = write_fixture(dir.path(), 4, 4);
    for strategy in Strategy::ALL {
        let err = strategy
            .read(&dir.path().join("nope.h5"), DATASET, &params(10, 4, None))
            .unwrap_err();
        assert!(matches!(err, Error::Hdf5(_)), "{strategy}: {err:?}");
        let err = strategy
            .read(&path, "nope", &params(10, 4, None))
            .unwrap_err();
        assert!(matches!(err, Error::Hdf5(_)), "{strategy}: {err:?}");
    }
}

#[test]
fn rank_and_dtype_are_checked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd.h5");
    {
        let file = hdf5::File::create(&path).unwrap();
        let flat = file.new_dataset::<f64>().shape(8).create("flat").unwrap();
        flat.write(&Array1::<f64>::zeros(8)).unwrap();
        let ints = file
            .new_dataset::<i32>()
            .shape((2, 2))
            .create("ints")
            .unwrap();
        ints.write(&Array2::<i32>::zeros((2, 2))).unwrap();
    }
    for strategy in Strategy::ALL {
        let err = strategy
            .read(&path, "flat", &params(10, 4, None))
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedRank { rank: 1, .. }), "{err:?}");
        let err = strategy
            .read(&path, "ints", &params(10, 4, None))
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedDtype { .. }), "{err:?}");
    }
}

#[test]
fn strategy_names_parse() {
    for strategy in Strategy::ALL {
        assert_eq!(strategy.cli_name().parse::<Strategy>(), Ok(strategy));
        assert_eq!(strategy.name().parse::<Strategy>(), Ok(strategy));
    }
    assert_eq!(Strategy::MemoryMap.to_string(), "Memory Map");
    assert!("mmap".parse::<Strategy>().is_err());
}

#[test]
fn expected_from_full_projects_selective_columns() {
    let full = Array2::from_shape_fn((3, 4), |(r, c)| (r * 4 + c) as f64);
    let subset = params(1, 1, Some(vec![3, 1]));
    assert_eq!(
        Strategy::Selective.expected_from_full(&full, &subset),
        full.select(Axis(1), &[3, 1])
    );
    assert_eq!(Strategy::Basic.expected_from_full(&full, &subset), full);
}
