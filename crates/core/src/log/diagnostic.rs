//! Compiler diagnostic recognition

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// An error/warning location found in captured output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub severity: Severity,
    pub message: String,
    /// Index of the output line this was parsed from
    pub log_line: usize,
}

fn diagnostic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<file>[^:\s][^:]*):(?P<line>\d+):(?:(?P<col>\d+):)?\s*(?P<sev>fatal error|error|warning|note):\s*(?P<msg>.*)$",
        )
        .expect("diagnostic pattern is valid")
    })
}

impl Diagnostic {
    /// Parse a `file:line[:col]: severity: message` line
    pub fn parse(text: &str, log_line: usize) -> Option<Self> {
        let caps = diagnostic_pattern().captures(text.trim_end())?;
        let severity = match &caps["sev"] {
            "warning" => Severity::Warning,
            "note" => Severity::Note,
            _ => Severity::Error,
        };
        Some(Self {
            file: caps["file"].to_string(),
            line: caps["line"].parse().ok()?,
            column: caps.name("col").and_then(|c| c.as_str().parse().ok()),
            severity,
            message: caps["msg"].to_string(),
            log_line,
        })
    }

    /// `file:line[:col]`, the form editors and terminals jump to
    pub fn location(&self) -> String {
        match self.column {
            Some(col) => format!("{}:{}:{}", self.file, self.line, col),
            None => format!("{}:{}", self.file, self.line),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location(), self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gcc_style() {
        let diag = Diagnostic::parse("code.c:12:5: error: expected ';' before '}' token", 3).unwrap();
        assert_eq!(diag.file, "code.c");
        assert_eq!(diag.line, 12);
        assert_eq!(diag.column, Some(5));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "expected ';' before '}' token");
        assert_eq!(diag.log_line, 3);
        assert_eq!(diag.location(), "code.c:12:5");
    }

    #[test]
    fn test_parse_without_column() {
        let diag = Diagnostic::parse("src/grid.dsl:7: warning: unused variable 'n'", 0).unwrap();
        assert_eq!(diag.column, None);
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.to_string(), "src/grid.dsl:7: warning: unused variable 'n'");
    }

    #[test]
    fn test_fatal_error_is_error() {
        let diag = Diagnostic::parse("code.c:1:10: fatal error: mpi.h: No such file or directory", 0)
            .unwrap();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "mpi.h: No such file or directory");
    }

    #[test]
    fn test_ignores_plain_output() {
        assert!(Diagnostic::parse("Hello from rank 0 of 4", 0).is_none());
        assert!(Diagnostic::parse("make: *** [Makefile:3: code] Error 1", 0).is_none());
        assert!(Diagnostic::parse("bash: dslc: command not found", 0).is_none());
    }
}
