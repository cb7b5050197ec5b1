use mpi_runner_core::{Diagnostic, LogView, MethodCatalog, MethodEntry};

/// Method listing for `mpi-runner methods`
pub fn format_method_table(catalog: &MethodCatalog) -> String {
    let mut out = String::new();
    out.push_str("🔨 Build methods:\n");
    push_entries(&mut out, catalog.build_methods());
    out.push_str("\n🚀 Run methods:\n");
    push_entries(&mut out, catalog.run_methods());
    out
}

fn push_entries(out: &mut String, entries: &[MethodEntry]) {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in entries {
        out.push_str(&format!(
            "   • {:<width$}  [{}]  {}\n",
            entry.name,
            entry.kind,
            entry.template,
            width = width
        ));
    }
}

/// One diagnostic plus the output line it came from
pub fn format_diagnostic(view: &LogView, diag: &Diagnostic, index: usize) -> String {
    let mut out = format!("📍 [{}/{}] {}", index + 1, view.diagnostics.len(), diag);
    if let Some(line) = view.lines.get(diag.log_line) {
        if line.trim() != diag.to_string() {
            out.push_str(&format!("\n   {}", line));
        }
    }
    out
}

/// Summary of the persisted log view for `mpi-runner log show`
pub fn format_log_view(view: &LogView) -> String {
    if view.command.is_empty() {
        return "ℹ️  No monitored run recorded yet\n".to_string();
    }

    let status = match (view.running, view.exit_code) {
        (true, _) => "running or interrupted".to_string(),
        (false, Some(0)) => "✅ exit 0".to_string(),
        (false, Some(code)) => format!("❌ exit {code}"),
        (false, None) => "unknown".to_string(),
    };

    let mut out = format!(
        "📜 Last run: {}\n   Status: {}\n   Output: {} lines\n",
        view.command,
        status,
        view.lines.len()
    );
    if view.diagnostics.is_empty() {
        out.push_str("   No diagnostics\n");
    } else {
        out.push_str(&format!("   Diagnostics ({}):\n", view.diagnostics.len()));
        for (i, diag) in view.diagnostics.iter().enumerate() {
            let marker = if view.cursor == Some(i) { "▶" } else { " " };
            out.push_str(&format!("   {marker} {diag}\n"));
        }
    }
    out
}
