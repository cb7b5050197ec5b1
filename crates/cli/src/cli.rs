use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mpi_runner_core::{DispatchMode, HandoffTarget};
use std::path::PathBuf;

use crate::commands::{
    build_command, compile_run_command, init_command, log_command, methods_command, run_command,
};

#[derive(Parser, Debug)]
#[command(name = "mpi-runner")]
#[command(version, about = "Build and run dslc/MPI programs", long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Runner {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where hand-off commands go, overriding the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HandoffArg {
    Clipboard,
    Stdout,
}

impl From<HandoffArg> for HandoffTarget {
    fn from(arg: HandoffArg) -> Self {
        match arg {
            HandoffArg::Clipboard => HandoffTarget::Clipboard,
            HandoffArg::Stdout => HandoffTarget::Stdout,
        }
    }
}

/// Options shared by every command that dispatches
#[derive(Args, Debug, Clone)]
pub struct DispatchArgs {
    /// Copy the command for manual execution instead of running it
    #[arg(long)]
    pub handoff: bool,

    /// Hand-off destination (defaults to the config file, then clipboard)
    #[arg(long, value_enum)]
    pub handoff_to: Option<HandoffArg>,

    /// Print the command without executing or handing it off
    #[arg(short, long)]
    pub dry_run: bool,
}

impl DispatchArgs {
    pub fn mode(&self) -> DispatchMode {
        if self.handoff {
            DispatchMode::Handoff
        } else {
            DispatchMode::Monitored
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List build and run methods
    #[command(visible_alias = "m")]
    Methods,
    /// Build the active file with a build method
    #[command(visible_alias = "b")]
    Build {
        /// Path to the source file
        file: Option<PathBuf>,

        /// Build method name (prompted when omitted)
        #[arg(short, long)]
        method: Option<String>,

        /// Process count for multi-process methods, clamped to 1..=200
        #[arg(short = 'n', long)]
        procs: Option<String>,

        #[command(flatten)]
        dispatch: DispatchArgs,
    },
    /// Run the program built from the active file
    #[command(visible_alias = "r")]
    Run {
        /// Path to the source file
        file: Option<PathBuf>,

        /// Run method name (prompted when omitted)
        #[arg(short, long)]
        method: Option<String>,

        /// Process count for multi-process methods, clamped to 1..=200
        #[arg(short = 'n', long)]
        procs: Option<String>,

        #[command(flatten)]
        dispatch: DispatchArgs,
    },
    /// Build, then run only if the build succeeds
    #[command(visible_alias = "cr")]
    CompileRun {
        /// Path to the source file
        file: Option<PathBuf>,

        /// Build method name (prompted when omitted)
        #[arg(short, long)]
        build: Option<String>,

        /// Run method name (prompted when omitted)
        #[arg(short, long)]
        run: Option<String>,

        /// Process count for the build stage
        #[arg(long)]
        build_procs: Option<String>,

        /// Process count for the run stage
        #[arg(long)]
        run_procs: Option<String>,

        #[command(flatten)]
        dispatch: DispatchArgs,
    },
    /// Show the last monitored run or step through its diagnostics
    #[command(visible_alias = "l")]
    Log {
        #[command(subcommand)]
        action: Option<LogAction>,
    },
    /// Write a starter .mpi-runner.json
    Init {
        /// Directory to initialize (defaults to the current directory)
        #[arg(long)]
        cwd: Option<String>,

        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    /// Print the captured run and its diagnostics
    Show,
    /// Jump to the next diagnostic
    Next,
    /// Jump to the previous diagnostic
    Prev,
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Methods => methods_command(),
            Commands::Build {
                file,
                method,
                procs,
                dispatch,
            } => build_command(file, method, procs, &dispatch),
            Commands::Run {
                file,
                method,
                procs,
                dispatch,
            } => run_command(file, method, procs, &dispatch),
            Commands::CompileRun {
                file,
                build,
                run,
                build_procs,
                run_procs,
                dispatch,
            } => compile_run_command(file, build, run, build_procs, run_procs, &dispatch),
            Commands::Log { action } => log_command(action.unwrap_or(LogAction::Show)),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}
