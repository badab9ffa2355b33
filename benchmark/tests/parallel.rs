use std::path::{Path, PathBuf};

use hdf5_read_strategies::{
    generate, harness, report::CSV_HEADER, BenchmarkConfig, FixtureSpec, Strategy,
    StrategyParams, ValidateMode, WorkerCommand,
};

fn worker() -> WorkerCommand {
    WorkerCommand::new(env!("CARGO_BIN_EXE_benchmark"), ["read-rows"])
}

fn params(workers: usize) -> StrategyParams {
    StrategyParams {
        workers,
        ..StrategyParams::default()
    }
    .with_worker(worker())
}

fn fixture(dir: &Path, rows: usize, cols: usize) -> PathBuf {
    let spec = FixtureSpec::new(dir.join(format!("p_{rows}x{cols}.h5")), "data", rows, cols);
    generate::generate_fixture(&spec, &mut generate::fixture_rng(Some(rows as u64))).unwrap();
    spec.path
}

// Row counts that are not a multiple of the worker count must come back whole.
#[test]
fn parallel_keeps_trailing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), 1003, 4);
    let written = Strategy::Basic
        .read(&path, "data", &StrategyParams::default())
        .unwrap();
    for workers in [1, 2, 3, 4, 5, 8] {
        let read = Strategy::Parallel
            .read(&path, "data", &params(workers))
            .unwrap();
        assert_eq!(read.dim(), (1003, 4), "workers={workers}");
        assert_eq!(read, written, "workers={workers}");
    }
}

#[test]
fn parallel_with_more_workers_than_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), 5, 3);
    let written = Strategy::Basic
        .read(&path, "data", &StrategyParams::default())
        .unwrap();
    let read = Strategy::Parallel.read(&path, "data", &params(8)).unwrap();
    assert_eq!(read, written);
}

#[test]
fn failing_worker_fails_the_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), 10, 2);
    // a worker that rejects its arguments
    let params = StrategyParams::default()
        .with_worker(WorkerCommand::new(env!("CARGO_BIN_EXE_benchmark"), ["no-such-command"]));
    let err = Strategy::Parallel.read(&path, "data", &params).unwrap_err();
    assert!(
        matches!(err, hdf5_read_strategies::Error::Worker { .. }),
        "{err:?}"
    );
}

#[test]
fn in_process_run_of_a_small_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = FixtureSpec::small().in_dir(dir.path());
    generate::generate_fixture(&fixture, &mut generate::fixture_rng(Some(2024))).unwrap();

    let config = BenchmarkConfig {
        fixtures: vec![fixture],
        params: StrategyParams::default().with_worker(worker()),
        validate: ValidateMode::Validate,
        output: dir.path().join("results").join("benchmark_results.csv"),
        write_json: true,
    };
    let runner = harness::InProcessRunner::new(config.params.clone(), config.validate);
    let report = harness::run_all(&config, &runner).unwrap();

    let methods: Vec<_> = report.records.iter().map(|r| r.method).collect();
    assert_eq!(methods, Strategy::ALL);
    for record in &report.records {
        assert_eq!(record.shape, (10_000, 100));
        assert_eq!(record.file, "test_small.h5");
    }

    let mut reader = csv::Reader::from_path(&config.output).unwrap();
    assert_eq!(reader.headers().unwrap().iter().collect::<Vec<_>>(), CSV_HEADER);
    assert_eq!(reader.records().count(), 5);
    assert!(config.output.with_extension("json").exists());
}
