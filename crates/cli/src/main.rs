use anyhow::Result;
use clap::Parser;
use mpi_runner::Runner;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    Runner::parse().command.execute()
}
