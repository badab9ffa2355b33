//! Synthetic fixture files: one 2-D dataset of uniform `[0, 1)` `f64` values per file.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    config::{FixtureSpec, GeneratorConfig, WriteMode},
    Error, Result,
};

/// One RNG stream for a whole generator run. With a seed, identical configs produce identical files.
pub fn fixture_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// `rows x cols` uniform samples, drawn in row-major order.
pub fn random_block(rng: &mut impl Rng, rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_simple_fn((rows, cols), || rng.gen::<f64>())
}

/// Create (or truncate) `spec.path` and fill `spec.dataset` with random values.
///
/// One-shot and blocked writes draw values in the same order, so for the same
/// RNG state they produce the same file contents. Parameters are checked before
/// the file is touched.
pub fn generate_fixture(spec: &FixtureSpec, rng: &mut impl Rng) -> Result<()> {
    if let WriteMode::Blocked { rows_per_block: 0 } = spec.write_mode {
        return Err(Error::InvalidParameter(
            "rows_per_block must be greater than zero",
        ));
    }
    let file = hdf5::File::create(&spec.path)?;
    let ds = file
        .new_dataset::<f64>()
        .shape((spec.rows, spec.cols))
        .create(spec.dataset.as_str())?;
    match spec.write_mode {
        WriteMode::OneShot => {
            if spec.rows > 0 {
                ds.write(&random_block(rng, spec.rows, spec.cols))?;
            }
        }
        WriteMode::Blocked { rows_per_block } => {
            let blocks = spec.rows.div_ceil(rows_per_block);
            let progress = block_progress(spec, blocks)?;
            for (i, start) in (0..spec.rows).step_by(rows_per_block).enumerate() {
                let end = (start + rows_per_block).min(spec.rows);
                let block = random_block(rng, end - start, spec.cols);
                ds.write_slice(&block, (start..end, ..))?;
                debug!(block = i + 1, blocks, start, end, "wrote block");
                progress.inc(1);
            }
            progress.finish_and_clear();
            info!("{}: wrote {blocks} blocks of {rows_per_block} rows", spec.file_name());
        }
    }
    Ok(())
}

/// Block counter on stderr. indicatif draws nothing when stderr is not a terminal.
fn block_progress(spec: &FixtureSpec, blocks: usize) -> Result<ProgressBar> {
    let bar = ProgressBar::with_draw_target(Some(blocks as u64), ProgressDrawTarget::stderr());
    bar.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.cyan} {msg} [{bar:30.cyan/bright.black}] {pos}/{len} blocks {elapsed_precise}",
            )?
            .progress_chars("#-"),
    );
    bar.set_message(spec.file_name());
    Ok(bar)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureStatus {
    pub path: PathBuf,
    /// `None` when the file does not exist.
    pub size_bytes: Option<u64>,
}

impl FixtureStatus {
    pub fn exists(&self) -> bool {
        self.size_bytes.is_some()
    }

    pub fn size_mb(&self) -> Option<f64> {
        self.size_bytes.map(|b| b as f64 / (1 << 20) as f64)
    }
}

/// Check that every fixture file is on disk and report its size.
pub fn verify_fixtures(specs: &[FixtureSpec]) -> Result<Vec<FixtureStatus>> {
    let mut statuses = Vec::with_capacity(specs.len());
    for spec in specs {
        let size_bytes = match std::fs::metadata(&spec.path) {
            Ok(md) => Some(md.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let status = FixtureStatus {
            path: spec.path.clone(),
            size_bytes,
        };
        match status.size_mb() {
            Some(mb) => info!("✓ {} exists ({mb:.2} MB)", spec.file_name()),
            None => warn!("✗ {} not found!", spec.file_name()),
        }
        statuses.push(status);
    }
    Ok(statuses)
}

/// Generate every fixture in order, then verify them.
pub fn generate_all(config: &GeneratorConfig) -> Result<Vec<FixtureStatus>> {
    let mut rng = fixture_rng(config.seed);
    for spec in &config.fixtures {
        info!(
            "Creating {} ({}x{} f64)...",
            spec.file_name(),
            spec.rows,
            spec.cols
        );
        generate_fixture(spec, &mut rng)?;
        info!("{} created successfully", spec.file_name());
    }
    info!("Verifying files exist...");
    verify_fixtures(&config.fixtures)
}
