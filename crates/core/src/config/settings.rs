use crate::{
    catalog::MethodCatalog,
    dispatch::{EnvMode, Environment, HandoffTarget},
    error::{Error, Result},
    params::ProcessCount,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file names, searched in this order in each directory
pub const CONFIG_FILE_NAMES: [&str; 2] = [".mpi-runner.json", "mpi-runner.json"];

/// Directory, relative to the project root, holding the persisted log view
pub const DEFAULT_STATE_DIR: &str = ".mpi-runner";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_mode: Option<EnvMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<HandoffTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_procs: Option<ProcessCount>,

    // Template overrides and additions, keyed by method name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_methods: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub run_methods: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Nearest config above `start_path`, or defaults when there is none
    pub fn discover(start_path: &Path) -> Result<(Self, Option<PathBuf>)> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Ok((Self::load_from_file(&path)?, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// The starter config written by `init`
    pub fn starter() -> Self {
        Self {
            env_mode: Some(EnvMode::LoginShell),
            handoff: Some(HandoffTarget::Clipboard),
            default_procs: Some(ProcessCount::clamped(4)),
            ..Default::default()
        }
    }

    /// Built-in catalog with this config's templates applied
    pub fn catalog(&self) -> Result<MethodCatalog> {
        MethodCatalog::with_overrides(&self.build_methods, &self.run_methods)
    }

    pub fn environment(&self) -> Environment {
        Environment::resolve(
            self.env_mode.unwrap_or_default(),
            self.shell.as_deref(),
            self.profile.as_deref(),
        )
    }

    pub fn handoff_target(&self) -> HandoffTarget {
        self.handoff.unwrap_or_default()
    }

    /// Where the log view lives. Relative `state_dir` values resolve against
    /// `project_root`.
    pub fn state_dir(&self, project_root: &Path) -> PathBuf {
        match &self.state_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_root.join(dir),
            None => project_root.join(DEFAULT_STATE_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            env_mode: Some(EnvMode::Inherit),
            handoff: Some(HandoffTarget::Stdout),
            default_procs: Some(ProcessCount::clamped(16)),
            run_methods: BTreeMap::from([(
                "MPI Hostfile".to_string(),
                "mpirun --hostfile hosts -np {} ./{}".to_string(),
            )]),
            ..Default::default()
        };

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert!(!json.contains("build_methods"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.handoff_target(), HandoffTarget::Clipboard);
        assert_eq!(config.environment().mode(), EnvMode::LoginShell);
    }

    #[test]
    fn test_starter_leaves_profile_to_the_shell() {
        let config = Config::starter();
        assert_eq!(config.profile, None);
        assert_eq!(config.env_mode, Some(EnvMode::LoginShell));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("profile"));
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".mpi-runner.json");
        std::fs::write(&path, r#"{"env_mode": "telepathy"}"#).unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src").join("kernels");
        std::fs::create_dir_all(&nested).unwrap();
        let path = temp_dir.path().join("mpi-runner.json");
        Config::starter().save_to_file(&path).unwrap();

        assert_eq!(Config::find_config_file(&nested), Some(path.clone()));

        let (config, found) = Config::discover(&nested).unwrap();
        assert_eq!(found, Some(path));
        assert_eq!(config.default_procs.map(|c| c.get()), Some(4));
    }

    #[test]
    fn test_state_dir_resolution() {
        let root = Path::new("/work/project");
        assert_eq!(
            Config::default().state_dir(root),
            PathBuf::from("/work/project/.mpi-runner")
        );

        let config = Config {
            state_dir: Some(PathBuf::from("build/state")),
            ..Default::default()
        };
        assert_eq!(config.state_dir(root), PathBuf::from("/work/project/build/state"));

        let config = Config {
            state_dir: Some(PathBuf::from("/tmp/mpi")),
            ..Default::default()
        };
        assert_eq!(config.state_dir(root), PathBuf::from("/tmp/mpi"));
    }

    #[test]
    fn test_catalog_rejects_bad_template() {
        let config = Config {
            build_methods: BTreeMap::from([("MPI Manual".to_string(), "dslc {}".to_string())]),
            ..Default::default()
        };
        assert!(matches!(config.catalog(), Err(Error::TemplateMismatch { .. })));
    }
}
