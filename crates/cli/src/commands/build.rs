use anyhow::Result;
use mpi_runner_core::{CommandBuilder, MethodRole};
use std::path::PathBuf;
use tracing::{debug, info};

use super::dispatch::dispatch_and_report;
use crate::cli::DispatchArgs;
use crate::utils::{ActiveFile, resolve_method, resolve_process_count, stdin_prompter};

pub fn build_command(
    file: Option<PathBuf>,
    method: Option<String>,
    procs: Option<String>,
    dispatch: &DispatchArgs,
) -> Result<()> {
    stage_command(MethodRole::Build, file, method, procs, dispatch)
}

/// Resolve one catalog method against the active file and dispatch it
pub(crate) fn stage_command(
    role: MethodRole,
    file: Option<PathBuf>,
    method: Option<String>,
    procs: Option<String>,
    dispatch: &DispatchArgs,
) -> Result<()> {
    let active = ActiveFile::resolve(file.as_deref())?;
    let catalog = active.config.catalog()?;
    let mut params = active.parameters()?;

    let method = {
        let mut prompter = stdin_prompter();
        let method = resolve_method(&mut prompter, &catalog, role, method)?;
        let entry = catalog.lookup(role, &method)?;
        if entry.is_multi_process() {
            let count = resolve_process_count(
                &mut prompter,
                procs.as_deref(),
                active.config.default_procs,
                role.label(),
            )?;
            params = params.with_process_count(count);
        } else if procs.is_some() {
            debug!("'{}' is single-process; ignoring process count", method);
        }
        method
    };

    let command = CommandBuilder::new(&catalog).resolve(role, &method, &params)?;
    info!("{} command: {}", role.label(), command.text);
    dispatch_and_report(&active, &command.text, dispatch)
}
