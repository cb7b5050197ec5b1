use anyhow::{Context, Result};
use mpi_runner_core::Config;
use mpi_runner_core::config::CONFIG_FILE_NAMES;
use std::{env, path::PathBuf};
use tracing::info;

use crate::utils::{Prompter, stdin_prompter};

pub fn init_command(cwd: Option<&str>, force: bool) -> Result<()> {
    let project_root = if let Some(cwd) = cwd {
        PathBuf::from(cwd)
    } else {
        env::current_dir().context("Failed to get current directory")?
    };

    let project_root = project_root
        .canonicalize()
        .context("Failed to canonicalize project root")?;

    let config_path = project_root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        let overwrite = stdin_prompter().confirm(
            &format!("Config already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            println!("❌ Config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }
    }

    let config = Config::starter();
    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Wrote starter config to {}", config_path.display());

    println!("✅ Created config: {}", config_path.display());
    println!("\n📌 Next steps:");
    println!("   • Set \"profile\" to the script that puts dslc and mpirun on PATH");
    println!("   • Add custom templates under \"build_methods\" or \"run_methods\"");
    println!("   • Run `mpi-runner methods` to see the full catalog");
    Ok(())
}
