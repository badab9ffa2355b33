//! Compare ways of reading a 2-D `f64` dataset out of an HDF5 file.
//!
//! # Usage
//!
//! 1. Describe the fixture files with [`FixtureSpec`]s and write them with [`generate::generate_all`].
//! 2. Pick a [`harness::Runner`]: [`harness::InProcessRunner`] measures in this process,
//!    the `benchmark` binary also has one that spawns a child per measurement.
//!    [`Strategy::Parallel`] reads through worker processes, so [`StrategyParams`] needs a
//!    [`WorkerCommand`] that serves [`strategies::write_rows`].
//! 3. Call [`harness::run_all`] with a [`BenchmarkConfig`]. Each fixture is read with every
//!    [`Strategy`], and the elapsed time, resident-memory delta and returned shape of every
//!    read end up in a CSV report.
//!
//! ```no_run
//! use hdf5_read_strategies::{
//!     generate, harness, BenchmarkConfig, FixtureSpec, GeneratorConfig, StrategyParams,
//!     ValidateMode, WorkerCommand,
//! };
//!
//! fn main() -> hdf5_read_strategies::Result<()> {
//!     let fixtures = vec![FixtureSpec::new("tiny.h5", "tiny_dataset", 1000, 10)];
//!     generate::generate_all(&GeneratorConfig {
//!         fixtures: fixtures.clone(),
//!         seed: Some(7),
//!     })?;
//!
//!     let config = BenchmarkConfig {
//!         fixtures,
//!         ..Default::default()
//!     };
//!     let params = StrategyParams::default()
//!         .with_worker(WorkerCommand::new("target/release/benchmark", ["read-rows"]));
//!     let runner = harness::InProcessRunner::new(params, ValidateMode::Validate);
//!     let report = harness::run_all(&config, &runner)?;
//!     assert_eq!(report.records.len(), 5);
//!     Ok(())
//! }
//! ```
//!
//! The heavy lifting (chunk layout, hyperslab selection, caching) happens inside the HDF5
//! library. This crate only decides how the reads are sliced and measured.

pub mod config;
mod error;
pub mod generate;
pub mod harness;
pub mod measure;
pub mod memory;
pub mod report;
pub mod strategies;

pub use config::{BenchmarkConfig, FixtureSpec, GeneratorConfig, ValidateMode, WriteMode};
pub use error::{Error, Result};
pub use measure::Measurement;
pub use report::{BenchmarkRecord, Report};
pub use strategies::{Strategy, StrategyParams, WorkerCommand};
