use std::{
    path::Path,
    time::{Duration, Instant},
};

use serde_with::serde_as;
use tracing::debug;

use crate::{
    config::ValidateMode,
    memory,
    strategies::{Strategy, StrategyParams},
    Error, Result,
};

/// Cost of one strategy invocation. Serializable so it can come back from a child process.
#[serde_as]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Measurement {
    pub strategy: Strategy,
    #[serde_as(as = "serde_with::DurationSecondsWithFrac<f64>")]
    pub elapsed: Duration,
    pub memory_delta_mb: f64,
    pub shape: (usize, usize),
}

/// Time one read and take the RSS delta around it.
///
/// The array is kept alive until after the second RSS snapshot. With
/// [`ValidateMode::Validate`] the result is then compared against a basic read,
/// outside the measured window.
pub fn measure(
    strategy: Strategy,
    path: &Path,
    dataset: &str,
    params: &StrategyParams,
    validate: ValidateMode,
) -> Result<Measurement> {
    let (data, elapsed, memory_delta_mb) = timed(memory::resident_set_size, || {
        strategy.read(path, dataset, params)
    })?;
    debug!(%strategy, ?elapsed, memory_delta_mb, "measured");

    if let ValidateMode::Validate = validate {
        let full = Strategy::Basic.read(path, dataset, params)?;
        if data != strategy.expected_from_full(&full, params) {
            return Err(Error::ValidationFailed {
                strategy,
                path: path.to_owned(),
                dataset: dataset.to_owned(),
            });
        }
    }

    Ok(Measurement {
        strategy,
        elapsed,
        memory_delta_mb,
        shape: data.dim(),
    })
}

/// Run `read` between two `rss` snapshots. Only `read` is inside the timed window.
fn timed<T>(
    mut rss: impl FnMut() -> Result<u64>,
    read: impl FnOnce() -> Result<T>,
) -> Result<(T, Duration, f64)> {
    let start_mem = rss()?;
    let start = Instant::now();
    let data = read()?;
    let elapsed = start.elapsed();
    let end_mem = rss()?;
    Ok((data, elapsed, memory::delta_mib(start_mem, end_mem)))
}
