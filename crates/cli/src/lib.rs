//! Command-line front end for mpi-runner
pub mod cli;
pub mod commands;
pub mod display;
pub mod utils;

pub use cli::{Commands, DispatchArgs, LogAction, Runner};
