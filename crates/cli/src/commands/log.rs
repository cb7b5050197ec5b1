use anyhow::{Context, Result};
use mpi_runner_core::LogView;
use tracing::debug;

use crate::cli::LogAction;
use crate::display::{format_diagnostic, format_log_view};
use crate::utils::discover_from_cwd;

pub fn log_command(action: LogAction) -> Result<()> {
    let (config, root) = discover_from_cwd()?;
    let path = LogView::path_in(&config.state_dir(&root));
    debug!("Log view: {}", path.display());
    let mut view = LogView::load(&path)
        .with_context(|| format!("Failed to load log view from {}", path.display()))?;

    let found = match action {
        LogAction::Show => {
            print!("{}", format_log_view(&view));
            return Ok(());
        }
        LogAction::Next => view.next_diagnostic().cloned(),
        LogAction::Prev => view.previous_diagnostic().cloned(),
    };

    let Some(diag) = found else {
        println!("ℹ️  No diagnostics in the last run");
        return Ok(());
    };

    // The cursor survives between invocations
    view.save(&path)?;
    let index = view.cursor.unwrap_or_default();
    println!("{}", format_diagnostic(&view, &diag, index));
    Ok(())
}
