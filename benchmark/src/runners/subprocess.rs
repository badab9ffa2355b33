use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use hdf5_read_strategies::{harness::Runner, Error, Measurement, Result, Strategy};
use tracing::debug;

use crate::ParamArgs;

/// Re-executes this binary's hidden `measure` subcommand for every measurement
/// and reads the [`Measurement`] back from the child's stdout.
pub(crate) struct SubprocessRunner {
    exe: PathBuf,
    params: ParamArgs,
    validate: bool,
}

impl SubprocessRunner {
    pub(crate) fn new(params: ParamArgs, validate: bool) -> Result<Self> {
        Ok(Self {
            exe: std::env::current_exe()?,
            params,
            validate,
        })
    }

    fn command(&self, path: &Path, dataset: &str, strategy: Strategy) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.arg("measure")
            .arg("--file")
            .arg(path)
            .arg("--dataset")
            .arg(dataset)
            .arg("--strategy")
            .arg(strategy.cli_name())
            .args(self.params.to_cli_args());
        if self.validate {
            cmd.arg("--validate");
        }
        cmd
    }
}

impl Runner for SubprocessRunner {
    fn measure(&self, path: &Path, dataset: &str, strategy: Strategy) -> Result<Measurement> {
        let mut cmd = self.command(path, dataset, strategy);
        debug!(?cmd, "spawning measurement");
        let output = cmd.output()?;
        measurement_from_output(&output, strategy)
    }
}

fn measurement_from_output(output: &Output, strategy: Strategy) -> Result<Measurement> {
    if !output.status.success() {
        return Err(Error::Subprocess {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    let m: Measurement = serde_json::from_slice(&output.stdout)?;
    if m.strategy != strategy {
        return Err(Error::MeasurementMismatch {
            expected: strategy,
            actual: m.strategy,
        });
    }
    Ok(m)
}
