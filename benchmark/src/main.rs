use std::{
    num::NonZeroUsize,
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::Parser;
use hdf5_read_strategies::{
    config, generate, harness, measure, strategies, BenchmarkConfig, FixtureSpec,
    GeneratorConfig, Strategy, StrategyParams, ValidateMode, WorkerCommand, WriteMode,
};
use itertools::Itertools;
use runners::{setup_runner, Isolation};
use tracing::info;

mod runners;

#[derive(clap::Parser)]
#[clap(about = "Generate HDF5 fixtures and benchmark strategies for reading them back")]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Write the fixture files.
    Generate {
        /// Directory the fixture files are written to.
        #[clap(long, default_value = ".")]
        dir: PathBuf,
        /// Seed for reproducible contents. Unseeded runs draw from OS entropy.
        #[clap(long)]
        seed: Option<u64>,
        /// Rows per write for tiers that are written in blocks.
        #[clap(long, default_value = "10000")]
        rows_per_block: NonZeroUsize,
        /// Tiers to generate. Defaults to all of them.
        #[clap(long = "tier", value_enum)]
        tiers: Vec<Tier>,
    },
    /// Read every fixture with every strategy and write the report.
    Run {
        /// Directory the fixture files are read from.
        #[clap(long, default_value = ".")]
        dir: PathBuf,
        #[clap(long, default_value = config::DEFAULT_OUTPUT)]
        output: PathBuf,
        /// Tiers to benchmark. Defaults to all of them.
        #[clap(long = "tier", value_enum)]
        tiers: Vec<Tier>,
        #[clap(long, value_enum, default_value = "in-process")]
        isolation: Isolation,
        /// Compare every strategy's result against a basic read.
        #[clap(long)]
        validate: bool,
        /// Also write the config and records as JSON next to the CSV.
        #[clap(long)]
        json: bool,
        #[clap(flatten)]
        params: ParamArgs,
    },
    /// Measure a single strategy and print the measurement as JSON on stdout.
    #[clap(hide = true)]
    Measure {
        #[clap(long)]
        file: PathBuf,
        #[clap(long)]
        dataset: String,
        #[clap(long)]
        strategy: Strategy,
        #[clap(long)]
        validate: bool,
        #[clap(flatten)]
        params: ParamArgs,
    },
    /// Parallel read worker: write rows `start..end` to stdout as little-endian `f64`s.
    #[clap(hide = true)]
    ReadRows {
        #[clap(long)]
        file: PathBuf,
        #[clap(long)]
        dataset: String,
        #[clap(long)]
        start: usize,
        #[clap(long)]
        end: usize,
    },
}

/// Parallel reads start this binary's `read-rows` subcommand once per row block.
fn read_rows_worker() -> std::io::Result<WorkerCommand> {
    Ok(WorkerCommand::new(std::env::current_exe()?, ["read-rows"]))
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Tier {
    Small,
    Medium,
    Large,
}

impl Tier {
    fn fixture(&self) -> FixtureSpec {
        match self {
            Tier::Small => FixtureSpec::small(),
            Tier::Medium => FixtureSpec::medium(),
            Tier::Large => FixtureSpec::large(),
        }
    }
}

fn tier_fixtures(tiers: &[Tier], dir: &std::path::Path) -> Vec<FixtureSpec> {
    let tiers = if tiers.is_empty() {
        &[Tier::Small, Tier::Medium, Tier::Large][..]
    } else {
        tiers
    };
    tiers.iter().map(|t| t.fixture().in_dir(dir)).collect()
}

#[derive(Clone, clap::Args)]
struct ParamArgs {
    /// Rows per window for the chunked strategy.
    #[clap(long, default_value = "10000")]
    chunk_rows: NonZeroUsize,
    /// Worker pool size for the parallel strategy.
    #[clap(long, default_value = "4")]
    workers: NonZeroUsize,
    /// Column subset for the selective strategy, e.g. `0,5,6`. Empty reads every column.
    #[clap(long, value_delimiter = ',')]
    columns: Vec<usize>,
}

impl ParamArgs {
    fn to_params(&self) -> hdf5_read_strategies::Result<StrategyParams> {
        Ok(StrategyParams {
            chunk_rows: self.chunk_rows.get(),
            workers: self.workers.get(),
            columns: if self.columns.is_empty() {
                None
            } else {
                Some(self.columns.clone())
            },
            worker: Some(read_rows_worker()?),
        })
    }

    /// The flags that reproduce `self` on a child's command line.
    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            "--chunk-rows".to_owned(),
            self.chunk_rows.to_string(),
            "--workers".to_owned(),
            self.workers.to_string(),
        ];
        if !self.columns.is_empty() {
            args.push("--columns".to_owned());
            args.push(self.columns.iter().join(","));
        }
        args
    }
}

fn validate_mode(validate: bool) -> ValidateMode {
    if validate {
        ValidateMode::Validate
    } else {
        ValidateMode::NoValidate
    }
}

fn main() -> Result<(), hdf5_read_strategies::Error> {
    // stdout is reserved for what `measure` and `read-rows` send back to the parent
    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Generate {
            dir,
            seed,
            rows_per_block,
            tiers,
        } => {
            std::fs::create_dir_all(&dir)?;
            let fixtures = tier_fixtures(&tiers, &dir)
                .into_iter()
                .map(|f| match f.write_mode {
                    WriteMode::Blocked { .. } => f.with_write_mode(WriteMode::Blocked {
                        rows_per_block: rows_per_block.get(),
                    }),
                    WriteMode::OneShot => f,
                })
                .collect();
            let start = Instant::now();
            info!("Generating test HDF5 files...");
            let statuses = generate::generate_all(&GeneratorConfig { fixtures, seed })?;
            info!(
                "generated {} of {} files in {}",
                statuses.iter().filter(|s| s.exists()).count(),
                statuses.len(),
                humantime::format_duration(round_to_millis(start.elapsed())),
            );
        }
        Command::Run {
            dir,
            output,
            tiers,
            isolation,
            validate,
            json,
            params,
        } => {
            let config = BenchmarkConfig {
                fixtures: tier_fixtures(&tiers, &dir),
                params: params.to_params()?,
                validate: validate_mode(validate),
                output,
                write_json: json,
            };
            let runner = setup_runner(isolation, &params, validate)?;
            let start = Instant::now();
            harness::run_all(&config, runner.as_ref())?;
            info!(
                "total benchmark time {}",
                humantime::format_duration(round_to_millis(start.elapsed()))
            );
        }
        Command::Measure {
            file,
            dataset,
            strategy,
            validate,
            params,
        } => {
            let m = measure::measure(
                strategy,
                &file,
                &dataset,
                &params.to_params()?,
                validate_mode(validate),
            )?;
            println!("{}", serde_json::to_string(&m)?);
        }
        Command::ReadRows {
            file,
            dataset,
            start,
            end,
        } => {
            strategies::write_rows(&file, &dataset, start..end, std::io::stdout().lock())?;
        }
    }
    Ok(())
}

fn round_to_millis(d: Duration) -> Duration {
    Duration::from_millis(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
