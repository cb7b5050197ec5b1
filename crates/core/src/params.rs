//! Build parameters derived from the active file, and process-count handling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A process count guaranteed to lie in `[ProcessCount::MIN, ProcessCount::MAX]`.
///
/// Out-of-range inputs saturate to the nearest bound instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u32")]
pub struct ProcessCount(u32);

impl ProcessCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 200;

    /// Clamp any integer into the valid range
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        if clamped != value {
            debug!("Process count {} clamped to {}", value, clamped);
        }
        // In range after clamping, so the cast is lossless
        Self(clamped as u32)
    }

    /// Parse free text, then clamp.
    ///
    /// Only text that is not an integer at all fails. Integers too large for
    /// `i64` still saturate to the bound on their side.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(value) => Ok(Self::clamped(value)),
            Err(_) if is_long_integer(trimmed) => Ok(Self::clamped(if trimmed.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            })),
            Err(_) => Err(Error::InvalidProcessCount(raw.to_string())),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

fn is_long_integer(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl From<i64> for ProcessCount {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<ProcessCount> for u32 {
    fn from(count: ProcessCount) -> Self {
        count.0
    }
}

impl fmt::Display for ProcessCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-invocation substitution values.
///
/// `output_name` is always `source_name` without its extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParameters {
    pub source_name: String,
    pub output_name: String,
    pub process_count: Option<ProcessCount>,
}

impl BuildParameters {
    /// Derive parameters from the active file, if one is bound.
    pub fn from_active_file(path: Option<&Path>) -> Result<Self> {
        let path = path.ok_or(Error::NoActiveFile)?;
        let source_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or(Error::NoActiveFile)?
            .to_string();
        let output_name = Path::new(&source_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&source_name)
            .to_string();

        debug!(
            "Resolved parameters from {}: source={}, output={}",
            path.display(),
            source_name,
            output_name
        );

        Ok(Self {
            source_name,
            output_name,
            process_count: None,
        })
    }

    pub fn with_process_count(mut self, count: ProcessCount) -> Self {
        self.process_count = Some(count);
        self
    }
}
