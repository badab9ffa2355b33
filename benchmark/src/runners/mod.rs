use hdf5_read_strategies::{
    harness::{InProcessRunner, Runner},
    Result,
};

use crate::{validate_mode, ParamArgs};

pub(crate) mod subprocess;

/// Where each measurement runs.
#[derive(Clone, Copy, clap::ValueEnum)]
pub(crate) enum Isolation {
    /// In this process. Memory deltas include everything else the process holds.
    InProcess,
    /// One child process per measurement, so each RSS delta starts from a fresh process.
    Subprocess,
}

pub(crate) fn setup_runner(
    isolation: Isolation,
    params: &ParamArgs,
    validate: bool,
) -> Result<Box<dyn Runner>> {
    Ok(match isolation {
        Isolation::InProcess => Box::new(InProcessRunner::new(
            params.to_params()?,
            validate_mode(validate),
        )),
        Isolation::Subprocess => Box::new(subprocess::SubprocessRunner::new(
            params.clone(),
            validate,
        )?),
    })
}
