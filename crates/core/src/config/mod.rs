//! Configuration management for mpi-runner

mod settings;

pub use settings::{CONFIG_FILE_NAMES, Config, DEFAULT_STATE_DIR};
