use anyhow::{Context, Result};
use mpi_runner_core::{CommandBuilder, MethodRole, Orchestrator};
use std::path::PathBuf;

use super::dispatch::{open_dispatcher, report_outcome};
use crate::cli::DispatchArgs;
use crate::utils::{ActiveFile, resolve_method, resolve_process_count, stdin_prompter};

/// Build, then run only if the build succeeded, as one dispatched command
pub fn compile_run_command(
    file: Option<PathBuf>,
    build_method: Option<String>,
    run_method: Option<String>,
    build_procs: Option<String>,
    run_procs: Option<String>,
    dispatch: &DispatchArgs,
) -> Result<()> {
    let active = ActiveFile::resolve(file.as_deref())?;
    let catalog = active.config.catalog()?;
    let mut build_params = active.parameters()?;
    let mut run_params = build_params.clone();

    let (build_method, run_method) = {
        let mut prompter = stdin_prompter();

        let build_method = resolve_method(&mut prompter, &catalog, MethodRole::Build, build_method)?;
        if catalog.lookup_build(&build_method)?.is_multi_process() {
            let count = resolve_process_count(
                &mut prompter,
                build_procs.as_deref(),
                active.config.default_procs,
                "build",
            )?;
            build_params = build_params.with_process_count(count);
        }

        let run_method = resolve_method(&mut prompter, &catalog, MethodRole::Run, run_method)?;
        if catalog.lookup_run(&run_method)?.is_multi_process() {
            // Offer the build's count first so the stages agree by default
            let default = build_params.process_count.or(active.config.default_procs);
            let count =
                resolve_process_count(&mut prompter, run_procs.as_deref(), default, "run")?;
            run_params = run_params.with_process_count(count);
        }

        (build_method, run_method)
    };

    let mut dispatcher = open_dispatcher(&active, dispatch);
    let mut orchestrator = Orchestrator::new(CommandBuilder::new(&catalog), &mut dispatcher);

    if dispatch.dry_run {
        let joined = orchestrator.plan(&build_method, &run_method, &build_params, &run_params)?;
        println!("{}", joined.text);
        return Ok(());
    }

    let outcome = orchestrator
        .compile_and_run(
            &build_method,
            &run_method,
            &build_params,
            &run_params,
            dispatch.mode(),
        )
        .with_context(|| format!("Failed to compile and run {}", active.path.display()))?;
    report_outcome(&outcome, dispatcher.handoff().name(), dispatcher.log())
}
