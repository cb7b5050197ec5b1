use anyhow::{Context, Result};
use mpi_runner_core::{BuildParameters, Config, Error};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The active file and everything derived from where it lives
#[derive(Debug, Clone)]
pub struct ActiveFile {
    pub path: PathBuf,
    /// Directory commands run in
    pub dir: PathBuf,
    /// Directory of the config file, or the working directory when there is none
    pub project_root: PathBuf,
    pub config: Config,
}

impl ActiveFile {
    /// Bind the active file. A missing argument, or a path that has not been
    /// saved to disk, is [`Error::NoActiveFile`].
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = path.ok_or(Error::NoActiveFile)?;
        if !path.is_file() {
            debug!("{} is not a saved file", path.display());
            return Err(Error::NoActiveFile.into());
        }

        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or(Error::NoActiveFile)?;

        let (config, config_path) = Config::discover(&dir)?;
        let project_root = project_root(config_path.as_deref(), current_dir()?);

        Ok(Self {
            path,
            dir,
            project_root,
            config,
        })
    }

    pub fn parameters(&self) -> Result<BuildParameters> {
        Ok(BuildParameters::from_active_file(Some(&self.path))?)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.config.state_dir(&self.project_root)
    }
}

/// Config and project root for commands that have no active file
pub fn discover_from_cwd() -> Result<(Config, PathBuf)> {
    let cwd = current_dir()?;
    let (config, config_path) = Config::discover(&cwd)?;
    Ok((config, project_root(config_path.as_deref(), cwd)))
}

/// The config file's directory, else `fallback`. Every command anchors the
/// state directory here, so `log` finds what `build` and `run` saved.
fn project_root(config_path: Option<&Path>, fallback: PathBuf) -> PathBuf {
    config_path
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or(fallback)
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}
