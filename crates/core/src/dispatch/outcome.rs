use serde::{Deserialize, Serialize};

/// Exit status reported by shells when the program to run cannot be found
pub const TOOL_NOT_FOUND_EXIT_CODE: i32 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Execute and capture output into the log view
    Monitored,
    /// Hand the literal command to the user; execute nothing
    Handoff,
}

/// Result of a single dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub mode: DispatchMode,
    pub exit_code: Option<i32>,
    /// Command offered for manual retry after a tool-not-found failure
    pub recovery_command: Option<String>,
    /// Whether the hand-off channel was written
    pub handed_off: bool,
}

impl ExecutionOutcome {
    pub fn handoff() -> Self {
        Self {
            mode: DispatchMode::Handoff,
            exit_code: None,
            recovery_command: None,
            handed_off: true,
        }
    }

    pub fn completed(exit_code: Option<i32>) -> Self {
        Self {
            mode: DispatchMode::Monitored,
            exit_code,
            recovery_command: None,
            handed_off: false,
        }
    }

    pub fn success(&self) -> bool {
        match self.mode {
            DispatchMode::Handoff => self.handed_off,
            DispatchMode::Monitored => self.exit_code == Some(0),
        }
    }

    pub fn is_tool_not_found(&self) -> bool {
        self.exit_code == Some(TOOL_NOT_FOUND_EXIT_CODE)
    }
}
