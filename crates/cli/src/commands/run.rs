use anyhow::Result;
use mpi_runner_core::MethodRole;
use std::path::PathBuf;

use super::build::stage_command;
use crate::cli::DispatchArgs;

pub fn run_command(
    file: Option<PathBuf>,
    method: Option<String>,
    procs: Option<String>,
    dispatch: &DispatchArgs,
) -> Result<()> {
    stage_command(MethodRole::Run, file, method, procs, dispatch)
}
