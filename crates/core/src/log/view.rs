use super::diagnostic::Diagnostic;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the persisted view inside the state directory
pub const LOG_VIEW_FILE: &str = "last-run.json";

/// Output of the most recent monitored run, with a diagnostic cursor.
///
/// One run owns the view at a time: [`LogView::begin`] discards whatever the
/// previous run left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogView {
    pub command: String,
    pub lines: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub running: bool,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the view for a new run of `command`
    pub fn begin(&mut self, command: &str) {
        if self.running {
            debug!("Replacing unfinished run of: {}", self.command);
        }
        *self = Self {
            command: command.to_string(),
            running: true,
            ..Self::default()
        };
    }

    /// Append one line of output, recording it as a diagnostic if it is one
    pub fn push_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if let Some(diag) = Diagnostic::parse(&line, self.lines.len()) {
            self.diagnostics.push(diag);
        }
        self.lines.push(line);
    }

    pub fn finish(&mut self, exit_code: Option<i32>) {
        self.exit_code = exit_code;
        self.running = false;
    }

    /// Move to the next diagnostic, wrapping to the first
    pub fn next_diagnostic(&mut self) -> Option<&Diagnostic> {
        if self.diagnostics.is_empty() {
            return None;
        }
        let next = match self.cursor {
            Some(i) if i + 1 < self.diagnostics.len() => i + 1,
            _ => 0,
        };
        self.cursor = Some(next);
        self.diagnostics.get(next)
    }

    /// Move to the previous diagnostic, wrapping to the last
    pub fn previous_diagnostic(&mut self) -> Option<&Diagnostic> {
        if self.diagnostics.is_empty() {
            return None;
        }
        let prev = match self.cursor {
            Some(i) if i > 0 => i - 1,
            _ => self.diagnostics.len() - 1,
        };
        self.cursor = Some(prev);
        self.diagnostics.get(prev)
    }

    pub fn current_diagnostic(&self) -> Option<&Diagnostic> {
        self.cursor.and_then(|i| self.diagnostics.get(i))
    }

    pub fn path_in(state_dir: &Path) -> PathBuf {
        state_dir.join(LOG_VIEW_FILE)
    }

    /// Load the persisted view; a missing file is an empty view
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let view = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse log view {}: {e}", path.display())))?;
        Ok(view)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
