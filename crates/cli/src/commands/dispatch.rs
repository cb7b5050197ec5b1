use anyhow::{Context, Result};
use mpi_runner_core::dispatch::{HandoffSink, StdoutSink, open_sink};
use mpi_runner_core::{DispatchMode, Dispatcher, ExecutionOutcome, LogView};
use tracing::debug;

use crate::cli::DispatchArgs;
use crate::utils::ActiveFile;

/// Dispatcher for commands of `active`: runs in the file's directory and
/// persists the log view under the project's state directory.
pub(crate) fn open_dispatcher(
    active: &ActiveFile,
    args: &DispatchArgs,
) -> Dispatcher<Box<dyn HandoffSink>> {
    let sink: Box<dyn HandoffSink> = if args.dry_run {
        // Never written; avoids touching the clipboard
        Box::new(StdoutSink)
    } else {
        let target = args
            .handoff_to
            .map(Into::into)
            .unwrap_or_else(|| active.config.handoff_target());
        debug!("Hand-off target: {:?}", target);
        open_sink(target)
    };

    Dispatcher::new(active.config.environment(), sink)
        .with_working_dir(&active.dir)
        .with_log_path(LogView::path_in(&active.state_dir()))
}

/// Dispatch a single resolved command and report how it went
pub(crate) fn dispatch_and_report(
    active: &ActiveFile,
    command: &str,
    args: &DispatchArgs,
) -> Result<()> {
    if args.dry_run {
        println!("{command}");
        return Ok(());
    }

    let mut dispatcher = open_dispatcher(active, args);
    let outcome = dispatcher
        .dispatch(command, args.mode())
        .with_context(|| format!("Failed to dispatch: {command}"))?;
    report_outcome(&outcome, dispatcher.handoff().name(), dispatcher.log())
}

/// Print the outcome on stderr and exit with the child's code on failure.
///
/// Status goes to stderr; stdout carries only hand-off text.
pub(crate) fn report_outcome(
    outcome: &ExecutionOutcome,
    sink_name: &str,
    log: &LogView,
) -> Result<()> {
    if outcome.mode == DispatchMode::Handoff {
        eprintln!("📋 Command handed off via {sink_name}");
        return Ok(());
    }

    if outcome.success() {
        eprintln!("✅ Finished: {}", log.command);
        return Ok(());
    }

    let code = outcome.exit_code.unwrap_or(1);
    if outcome.is_tool_not_found() {
        eprintln!("❌ Toolchain not found (exit {code})");
        match (&outcome.recovery_command, outcome.handed_off) {
            (Some(_), true) => eprintln!(
                "📋 The command was handed off via {sink_name}; run it in a shell where the toolchain is on PATH"
            ),
            (Some(cmd), false) => eprintln!("   Run it manually: {cmd}"),
            (None, _) => {}
        }
    } else {
        eprintln!("❌ Command failed with exit code {code}");
        if !log.diagnostics.is_empty() {
            eprintln!(
                "   {} diagnostics captured; step through them with `mpi-runner log next`",
                log.diagnostics.len()
            );
        }
    }
    std::process::exit(code);
}
