//! Explicit configuration for fixture generation and benchmark runs.
//!
//! The defaults reproduce the fixed tiers: three files of 10k, 100k and 1M rows
//! by 100 columns of `f64`, read with 10k-row windows and a pool of 4 workers.
//! Tests build small [`FixtureSpec`]s directly instead.

use std::path::{Path, PathBuf};

use crate::strategies::StrategyParams;

pub const DEFAULT_COLS: usize = 100;
pub const DEFAULT_ROWS_PER_BLOCK: usize = 10_000;
pub const DEFAULT_OUTPUT: &str = "results/benchmark_results.csv";

/// How the generator writes a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum WriteMode {
    /// Materialize the whole array, write it with one call.
    OneShot,
    /// Create the dataset at full size, then fill it `rows_per_block` rows at a time.
    /// Peak memory is bounded by one block.
    Blocked { rows_per_block: usize },
}

/// One fixture file holding one 2-D `f64` dataset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FixtureSpec {
    pub path: PathBuf,
    pub dataset: String,
    pub rows: usize,
    pub cols: usize,
    pub write_mode: WriteMode,
}

impl FixtureSpec {
    pub fn new(
        path: impl Into<PathBuf>,
        dataset: impl Into<String>,
        rows: usize,
        cols: usize,
    ) -> Self {
        FixtureSpec {
            path: path.into(),
            dataset: dataset.into(),
            rows,
            cols,
            write_mode: WriteMode::OneShot,
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// `test_small.h5` / `small_dataset`, 10000x100 (~8MB).
    pub fn small() -> Self {
        Self::new("test_small.h5", "small_dataset", 10_000, DEFAULT_COLS)
    }

    /// `test_medium.h5` / `medium_dataset`, 100000x100 (~80MB).
    pub fn medium() -> Self {
        Self::new("test_medium.h5", "medium_dataset", 100_000, DEFAULT_COLS)
    }

    /// `test_large.h5` / `large_dataset`, 1000000x100 (~800MB), written in row blocks.
    pub fn large() -> Self {
        Self::new("test_large.h5", "large_dataset", 1_000_000, DEFAULT_COLS).with_write_mode(
            WriteMode::Blocked {
                rows_per_block: DEFAULT_ROWS_PER_BLOCK,
            },
        )
    }

    /// Re-root a relative fixture path under `dir`.
    pub fn in_dir(mut self, dir: &Path) -> Self {
        if self.path.is_relative() {
            self.path = dir.join(&self.path);
        }
        self
    }

    /// The file name as it appears in the report's `File` column.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

pub fn default_fixtures() -> Vec<FixtureSpec> {
    vec![FixtureSpec::small(), FixtureSpec::medium(), FixtureSpec::large()]
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct GeneratorConfig {
    pub fixtures: Vec<FixtureSpec>,
    /// `None` seeds from OS entropy, so runs are not reproducible.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            fixtures: default_fixtures(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ValidateMode {
    NoValidate,
    Validate,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BenchmarkConfig {
    pub fixtures: Vec<FixtureSpec>,
    pub params: StrategyParams,
    pub validate: ValidateMode,
    /// CSV report path. Overwritten on every run.
    pub output: PathBuf,
    /// Also write `<output>.json` with this config and the records.
    pub write_json: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            fixtures: default_fixtures(),
            params: StrategyParams::default(),
            validate: ValidateMode::NoValidate,
            output: PathBuf::from(DEFAULT_OUTPUT),
            write_json: false,
        }
    }
}
