pub mod formatter;

pub use formatter::{format_diagnostic, format_log_view, format_method_table};
