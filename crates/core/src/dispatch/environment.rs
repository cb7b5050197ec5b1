//! Environment resolution for monitored runs
//!
//! Toolchains such as `mpicc` and `srun` are often only put on `PATH` by the
//! user's interactive shell profile. A login shell that sources the profile
//! before the command sees the same `PATH` as the user's terminal.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const FALLBACK_LOGIN_SHELL: &str = "/bin/bash";
const PLAIN_SHELL: &str = "/bin/sh";

/// Interactive profile a login shell of this name reads, relative to `$HOME`
fn default_profile_for(shell: &Path) -> &'static str {
    match shell.file_name().and_then(|name| name.to_str()) {
        Some("bash") => ".bashrc",
        Some("zsh") => ".zshrc",
        _ => ".profile",
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvMode {
    /// `<shell> -l -c` with the profile sourced first
    #[default]
    LoginShell,
    /// `/bin/sh -c` with the invoking process environment
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    mode: EnvMode,
    shell: PathBuf,
    profile: Option<PathBuf>,
}

impl Environment {
    /// Run under the invoking environment
    pub fn inherit() -> Self {
        Self {
            mode: EnvMode::Inherit,
            shell: PathBuf::from(PLAIN_SHELL),
            profile: None,
        }
    }

    pub fn login_shell(shell: impl Into<PathBuf>, profile: Option<PathBuf>) -> Self {
        Self {
            mode: EnvMode::LoginShell,
            shell: shell.into(),
            profile,
        }
    }

    /// Fill in unset pieces from `$SHELL` and `$HOME`. Without an explicit
    /// profile, the one matching the shell is used.
    pub fn resolve(mode: EnvMode, shell: Option<&str>, profile: Option<&str>) -> Self {
        match mode {
            EnvMode::Inherit => {
                let mut env = Self::inherit();
                if let Some(shell) = shell {
                    env.shell = PathBuf::from(shell);
                }
                env
            }
            EnvMode::LoginShell => {
                let shell = shell
                    .map(str::to_string)
                    .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
                    .unwrap_or_else(|| FALLBACK_LOGIN_SHELL.to_string());
                let profile = profile.map(expand_home).or_else(|| {
                    let default = default_profile_for(Path::new(&shell));
                    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(default))
                });
                Self::login_shell(shell, profile)
            }
        }
    }

    pub fn mode(&self) -> EnvMode {
        self.mode
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    pub fn profile(&self) -> Option<&Path> {
        self.profile.as_deref()
    }

    /// The argv that runs `command` under this environment
    pub fn wrap(&self, command: &str) -> Vec<String> {
        let shell = self.shell.to_string_lossy().into_owned();
        match self.mode {
            EnvMode::Inherit => vec![shell, "-c".to_string(), command.to_string()],
            EnvMode::LoginShell => {
                let script = match &self.profile {
                    Some(profile) => {
                        let profile = shell_quote(&profile.to_string_lossy());
                        format!("if [ -f {profile} ]; then . {profile} >/dev/null 2>&1; fi; {command}")
                    }
                    None => command.to_string(),
                };
                vec![shell, "-l".to_string(), "-c".to_string(), script]
            }
        }
    }

    pub fn command(&self, command: &str) -> Command {
        let argv = self.wrap(command);
        debug!("Wrapped command: {:?}", argv);
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]);
        cmd
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::resolve(EnvMode::LoginShell, None, None)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Single-quote a string for POSIX shells
pub fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_wraps_plain_shell() {
        let env = Environment::inherit();
        assert_eq!(
            env.wrap("make code && ./code"),
            vec!["/bin/sh", "-c", "make code && ./code"]
        );
    }

    #[test]
    fn test_login_shell_sources_profile_first() {
        let env = Environment::login_shell("/bin/zsh", Some(PathBuf::from("/home/u/.zshrc")));
        let argv = env.wrap("mpirun -np 4 ./code");
        assert_eq!(argv[0], "/bin/zsh");
        assert_eq!(argv[1], "-l");
        assert_eq!(argv[2], "-c");
        assert_eq!(
            argv[3],
            "if [ -f '/home/u/.zshrc' ]; then . '/home/u/.zshrc' >/dev/null 2>&1; fi; mpirun -np 4 ./code"
        );
    }

    #[test]
    fn test_login_shell_without_profile() {
        let env = Environment::login_shell("/bin/bash", None);
        assert_eq!(env.wrap("./code")[3], "./code");
    }

    #[test]
    fn test_resolve_respects_explicit_values() {
        let env = Environment::resolve(EnvMode::LoginShell, Some("/bin/ksh"), Some("/etc/kshrc"));
        assert_eq!(env.mode(), EnvMode::LoginShell);
        assert_eq!(env.shell(), Path::new("/bin/ksh"));
        assert_eq!(env.profile(), Some(Path::new("/etc/kshrc")));

        let env = Environment::resolve(EnvMode::Inherit, None, Some("/etc/kshrc"));
        assert_eq!(env, Environment::inherit());
    }

    #[test]
    fn test_default_profile_follows_shell() {
        let Some(home) = std::env::var_os("HOME").map(PathBuf::from) else {
            return;
        };

        let env = Environment::resolve(EnvMode::LoginShell, Some("/bin/zsh"), None);
        assert_eq!(env.profile(), Some(home.join(".zshrc").as_path()));

        let env = Environment::resolve(EnvMode::LoginShell, Some("/usr/local/bin/bash"), None);
        assert_eq!(env.profile(), Some(home.join(".bashrc").as_path()));

        let env = Environment::resolve(EnvMode::LoginShell, Some("/bin/dash"), None);
        assert_eq!(env.profile(), Some(home.join(".profile").as_path()));
        assert!(env.wrap("echo ran")[3].contains(".profile"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
