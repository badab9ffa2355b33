//! Run every strategy against every fixture and collect the report.

use std::path::Path;

use tracing::info;

use crate::{
    config::{BenchmarkConfig, FixtureSpec, ValidateMode},
    measure::{measure, Measurement},
    report::{BenchmarkRecord, Report},
    strategies::{Strategy, StrategyParams},
    Result,
};

/// Performs one measurement. Implementations decide where the read runs.
pub trait Runner {
    fn measure(&self, path: &Path, dataset: &str, strategy: Strategy) -> Result<Measurement>;
}

/// Measures in the current process. Memory deltas carry whatever else this process allocated.
pub struct InProcessRunner {
    params: StrategyParams,
    validate: ValidateMode,
}

impl InProcessRunner {
    pub fn new(params: StrategyParams, validate: ValidateMode) -> Self {
        Self { params, validate }
    }
}

impl Runner for InProcessRunner {
    fn measure(&self, path: &Path, dataset: &str, strategy: Strategy) -> Result<Measurement> {
        measure(strategy, path, dataset, &self.params, self.validate)
    }
}

/// All strategies against one fixture, in [`Strategy::ALL`] order.
#[tracing::instrument(skip_all, fields(file = %fixture.file_name()))]
pub fn run_benchmark(fixture: &FixtureSpec, runner: &dyn Runner) -> Result<Vec<BenchmarkRecord>> {
    info!("Benchmarking {}...", fixture.file_name());
    let mut records = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let m = runner.measure(&fixture.path, &fixture.dataset, strategy)?;
        info!(
            "{:<10} {:>9.4}s {:>9.2} MB  {:?}",
            strategy.name(),
            m.elapsed.as_secs_f64(),
            m.memory_delta_mb,
            m.shape
        );
        records.push(BenchmarkRecord {
            method: m.strategy,
            elapsed: m.elapsed,
            memory_delta_mb: m.memory_delta_mb,
            shape: m.shape,
            file: fixture.file_name(),
        });
    }
    Ok(records)
}

/// Benchmark every fixture in order and write the report. Nothing is written if any fixture fails.
pub fn run_all(config: &BenchmarkConfig, runner: &dyn Runner) -> Result<Report> {
    let mut report = Report::default();
    for fixture in &config.fixtures {
        report.extend(run_benchmark(fixture, runner)?);
    }
    report.write_csv(&config.output)?;
    if config.write_json {
        report.write_json(&config.output.with_extension("json"), config)?;
    }
    info!(
        "Benchmarking complete! Results saved to {}",
        config.output.display()
    );
    Ok(report)
}
