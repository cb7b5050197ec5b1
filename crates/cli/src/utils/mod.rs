pub mod file;
pub mod prompt;

pub use file::{ActiveFile, discover_from_cwd};
pub use prompt::{LinePrompter, Prompter, resolve_method, resolve_process_count, stdin_prompter};
