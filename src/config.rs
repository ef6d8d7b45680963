// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify what setup should do: which repositories to clone, which apps to
//! install, which runtime manager to install, and which aliases to add. Every
//! setting has a built-in default, so a configuration file only needs to list
//! what it wants to change.
//!
//! # Lookup
//!
//! An explicit path given by the caller always wins. Otherwise
//! `$XDG_CONFIG_HOME/devboot/config.toml` is used if it exists, with
//! `~/.config` standing in for an unset `XDG_CONFIG_HOME` on every platform.
//! Built-in defaults apply if no file exists there.
//!
//! # Shell Expansion
//!
//! All path settings go through shell expansion after being read, so `~` and
//! environment variables like `$HOME` can be used freely.

use crate::path::{default_config_path, home_dir, path_exists, path_from_home_dir, NoWayHome};

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info};

const HOMEBREW_INSTALL_SCRIPT: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";
const NVM_INSTALL_SCRIPT: &str =
    "https://raw.githubusercontent.com/nvm-sh/nvm/v0.39.3/install.sh";

const ALIASES: &str = r#"
# General Conveniences
alias c='clear'
alias cls='clear'

# Git
alias gs='git status'
alias gco='git checkout'
alias gcob='git checkout -b'
alias gc='git commit'
alias gcm='git commit -m'
alias gm='git merge'
alias gp='git push'
alias gf='git fetch'
alias gl='git pull'
"#;

/// Complete setup configuration.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory that repository groups are cloned into.
    pub workspace_dir: PathBuf,

    /// Repositories to clone.
    pub repos: RepoSettings,

    /// Package manager and apps to install through it.
    pub packages: PackageSettings,

    /// Runtime version manager to install.
    pub runtime_manager: RuntimeManagerSettings,

    /// Shell aliases to add to the user's profile.
    pub aliases: AliasSettings,
}

impl Config {
    /// Load configuration.
    ///
    /// Reads `path` if given. Otherwise reads the default configuration file
    /// if it exists, falling back to built-in defaults.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if the configuration file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if the configuration file is invalid.
    /// - Return [`ConfigError::ShellExpansion`] if a path setting cannot be expanded.
    /// - Return [`ConfigError::NoWayHome`] if the default location cannot be determined.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::read(path);
        }

        let default = default_config_path()?;
        if path_exists(&default) {
            return Self::read(&default);
        }

        debug!("no configuration at {:?}, using defaults", default.display());
        Self::default().expanded()
    }

    /// Read and parse configuration file at `path`.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if the configuration file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if the configuration file is invalid.
    /// - Return [`ConfigError::ShellExpansion`] if a path setting cannot be expanded.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("load configuration from {:?}", path.display());
        read_to_string(path)
            .map_err(|err| ConfigError::Read {
                source: err,
                path: path.into(),
            })?
            .parse()
    }

    /// Apply shell expansion to every path setting.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ShellExpansion`] if a path setting cannot be expanded.
    /// - Return [`ConfigError::NoWayHome`] if `~` is used, but the home
    ///   directory cannot be determined.
    pub fn expanded(mut self) -> Result<Self> {
        self.workspace_dir = expand_path(&self.workspace_dir)?;
        self.runtime_manager.rc_file = expand_path(&self.runtime_manager.rc_file)?;
        self.aliases.profile = expand_path(&self.aliases.profile)?;

        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("~/workspace"),
            repos: RepoSettings::default(),
            packages: PackageSettings::default(),
            runtime_manager: RuntimeManagerSettings::default(),
            aliases: AliasSettings::default(),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path setting.
        config.expanded()
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Repository cloning settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RepoSettings {
    /// Remote prefix that repository names are appended to.
    pub remote_prefix: String,

    /// Repository groups, each cloned into its own subdirectory of the
    /// workspace. Groups are processed in sorted order.
    pub groups: BTreeMap<String, Vec<String>>,
}

impl RepoSettings {
    /// Determine remote URL of target repository.
    pub fn remote_url(&self, repo: &str) -> String {
        format!("{}{repo}.git", self.remote_prefix)
    }
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            remote_prefix: "git@github.com:VorTECHsa/".into(),
            groups: BTreeMap::from([(
                "adt".into(),
                vec!["web".into(), "app-core".into(), "api".into()],
            )]),
        }
    }
}

/// Package manager settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PackageSettings {
    /// Executable of the package manager.
    pub manager: String,

    /// Command line that installs the package manager itself.
    pub installer: Vec<String>,

    /// Flag selecting the GUI application install variant.
    pub variant_flag: String,

    /// Apps to install, in order.
    pub apps: Vec<String>,

    /// Apps installed without the variant flag.
    pub caskless: Vec<String>,
}

impl PackageSettings {
    /// Check if app is installed without the variant flag.
    pub fn is_caskless(&self, app: &str) -> bool {
        self.caskless.iter().any(|name| name == app)
    }
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            manager: "brew".into(),
            installer: vec![
                "/bin/bash".into(),
                "-c".into(),
                format!("/bin/bash -c \"$(curl -fsSL {HOMEBREW_INSTALL_SCRIPT})\""),
            ],
            variant_flag: "--cask".into(),
            apps: ["insomnia", "visual-studio-code", "obs", "stats", "sops"]
                .map(String::from)
                .to_vec(),
            caskless: vec!["sops".into()],
        }
    }
}

/// Runtime version manager settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeManagerSettings {
    /// Display name of the runtime manager.
    pub name: String,

    /// Shell rc file the runtime manager registers itself in.
    pub rc_file: PathBuf,

    /// Line whose presence in the rc file means that the runtime manager is
    /// installed.
    pub marker: String,

    /// Command line that installs the runtime manager.
    pub installer: Vec<String>,
}

impl Default for RuntimeManagerSettings {
    fn default() -> Self {
        Self {
            name: "nvm".into(),
            rc_file: PathBuf::from("~/.zshrc"),
            marker: r#"export NVM_DIR="$HOME/.nvm""#.into(),
            installer: vec![
                "/bin/bash".into(),
                "-c".into(),
                format!("curl -o- {NVM_INSTALL_SCRIPT} | bash"),
            ],
        }
    }
}

/// Shell alias settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AliasSettings {
    /// Profile file that aliases are appended to.
    pub profile: PathBuf,

    /// Versioned marker line identifying the alias block.
    pub marker: String,

    /// Alias definitions.
    pub text: String,
}

impl Default for AliasSettings {
    fn default() -> Self {
        Self {
            profile: PathBuf::from("~/.zprofile"),
            marker: format!("# -- Aliases (added by {} v1)", env!("CARGO_PKG_NAME")),
            text: ALIASES.into(),
        }
    }
}

/// Expand environment variables, then a leading `~`, in `path`.
///
/// The home directory comes from [`path_from_home_dir`], so `~` means the same
/// thing here as everywhere else. `~user` forms are left alone.
fn expand_path(path: &Path) -> Result<PathBuf> {
    let expanded = PathBuf::from(
        shellexpand::env(path.to_string_lossy().as_ref())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    );

    let expanded = match expanded.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home_dir()?,
        Ok(rest) => path_from_home_dir(rest)?,
        Err(_) => expanded,
    };

    Ok(expanded)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file cannot be read.
    #[error("failed to read configuration file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Home directory needed for `~` or the default location cannot be determined.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("HOME", "/home/blah"), ("CODE", "/srv/code")])]
    fn deserialize_partial_config() -> anyhow::Result<()> {
        let result: Config = r#"
            workspace_dir = "$CODE"

            [repos]
            remote_prefix = "git@github.com:blah/"

            [repos.groups]
            tools = ["cli", "lint"]
            adt = ["web"]

            [packages]
            apps = ["firefox", "jq"]
            caskless = ["jq"]
        "#
        .parse()?;

        let expect = Config {
            workspace_dir: PathBuf::from("/srv/code"),
            repos: RepoSettings {
                remote_prefix: "git@github.com:blah/".into(),
                groups: BTreeMap::from([
                    ("adt".into(), vec!["web".into()]),
                    ("tools".into(), vec!["cli".into(), "lint".into()]),
                ]),
            },
            packages: PackageSettings {
                apps: vec!["firefox".into(), "jq".into()],
                caskless: vec!["jq".into()],
                ..PackageSettings::default()
            },
            runtime_manager: RuntimeManagerSettings {
                rc_file: PathBuf::from("/home/blah/.zshrc"),
                ..RuntimeManagerSettings::default()
            },
            aliases: AliasSettings {
                profile: PathBuf::from("/home/blah/.zprofile"),
                ..AliasSettings::default()
            },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn printed_config_parses_back() -> anyhow::Result<()> {
        let config = Config::default().expanded()?;
        assert_eq!(config.workspace_dir, PathBuf::from("/home/blah/workspace"));

        let result: Config = config.to_string().parse()?;
        assert_eq!(result, config);

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah"), ("XDG_CONFIG_HOME", "/nonexistent/devboot-test")])]
    fn load_without_file_uses_defaults() -> anyhow::Result<()> {
        let result = Config::load(None)?;
        assert_eq!(result, Config::default().expanded()?);

        Ok(())
    }

    #[sealed_test]
    fn load_with_explicit_path() -> anyhow::Result<()> {
        std::fs::write("devboot.toml", "workspace_dir = \"/srv/blah\"\n")?;
        let result = Config::load(Some(Path::new("devboot.toml")))?;
        assert_eq!(result.workspace_dir, PathBuf::from("/srv/blah"));

        let result = Config::load(Some(Path::new("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah"), ("CODE", "/srv/code")])]
    fn tilde_resolves_to_home_dir() -> anyhow::Result<()> {
        assert_eq!(expand_path(Path::new("~"))?, PathBuf::from("/home/blah"));
        assert_eq!(expand_path(Path::new("~/.zshrc"))?, PathBuf::from("/home/blah/.zshrc"));
        assert_eq!(expand_path(Path::new("$CODE/web"))?, PathBuf::from("/srv/code/web"));
        assert_eq!(expand_path(Path::new("~blah/x"))?, PathBuf::from("~blah/x"));
        assert_eq!(expand_path(Path::new("relative/~"))?, PathBuf::from("relative/~"));

        Ok(())
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let result: Result<Config> = "workspace_dir = \"$DEVBOOT_SURELY_UNDEFINED\"".parse();
        assert!(matches!(result, Err(ConfigError::ShellExpansion(_))));
    }

    #[test]
    fn caskless_lookup_and_remote_url() {
        let packages = PackageSettings::default();
        assert!(packages.is_caskless("sops"));
        assert!(!packages.is_caskless("obs"));

        let repos = RepoSettings::default();
        assert_eq!(repos.remote_url("web"), "git@github.com:VorTECHsa/web.git");
    }
}
