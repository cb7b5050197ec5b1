//! Monitored-run log with diagnostic navigation

mod diagnostic;
mod view;

pub use diagnostic::{Diagnostic, Severity};
pub use view::{LOG_VIEW_FILE, LogView};
