// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Developer machine setup.
//!
//! Setup is a fixed sequence of steps:
//!
//! 1. Ensure that the workspace directory exists.
//! 2. Clone every configured repository group into the workspace.
//! 3. Install apps through the package manager, installing the package
//!    manager itself first if needed, followed by the runtime version
//!    manager.
//! 4. Append shell aliases to the user's profile.
//!
//! Each step checks whether its work is already done before doing anything,
//! so setup can simply be run again after a failure. The first failing step
//! aborts the whole sequence.
//!
//! All side effects go through the [`Executor`] that setup was constructed
//! with. Handing it a dry-run executor previews the whole sequence without
//! changing anything.

pub mod aliases;
pub mod apps;
pub mod repos;

use crate::{
    config::Config,
    exec::{Action, ExecError, Executor, Invocation, SystemExecutor},
    path::path_exists,
    text::TextError,
};

use tracing::{info, instrument};

/// Setup of a developer machine.
#[derive(Debug)]
pub struct Setup<E = SystemExecutor>
where
    E: Executor,
{
    pub(crate) config: Config,
    pub(crate) executor: E,
}

impl<E> Setup<E>
where
    E: Executor,
{
    /// Construct new setup.
    pub fn new(config: Config, executor: E) -> Self {
        Self { config, executor }
    }

    /// Run every setup step in order.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError`] of the first step that fails.
    pub fn run(&self) -> Result<()> {
        self.ensure_workspace_dir()?;
        self.clone_repos()?;
        self.install_apps()?;
        self.ensure_aliases()?;

        if self.executor.is_dry_run() {
            info!("dry run complete; nothing was changed");
        } else {
            info!("setup complete");
        }

        Ok(())
    }

    /// Create workspace directory if it is missing.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Exec`] if the directory cannot be created.
    #[instrument(skip(self), level = "debug")]
    pub fn ensure_workspace_dir(&self) -> Result<()> {
        let workspace_dir = &self.config.workspace_dir;
        if path_exists(workspace_dir) {
            info!("workspace {:?} already exists", workspace_dir.display());
            return Ok(());
        }

        self.executor
            .perform(Action::CreateDir(workspace_dir.clone()))?;

        Ok(())
    }

    /// Perform configured installer command line.
    pub(crate) fn run_installer(&self, name: &str, argv: &[String]) -> Result<()> {
        let invocation = Invocation::from_argv(argv).ok_or_else(|| SetupError::EmptyInstaller {
            name: name.into(),
        })?;

        // INVARIANT: Installers may ask for sudo, so they get the terminal.
        self.executor.perform(Action::Spawn(invocation.interactive()))?;

        Ok(())
    }
}

/// Setup error types.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Side effect failed.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Text block could not be applied, or a file could not be scanned.
    #[error(transparent)]
    Text(#[from] TextError),

    /// Installer command line is empty.
    #[error("installer for {name} has an empty command line")]
    EmptyInstaller { name: String },
}

/// Friendly result alias :3
pub type Result<T, E = SetupError> = std::result::Result<T, E>;

/// Configuration with relative paths and an always available package manager.
///
/// Meant for tests running inside of a sealed working directory.
#[cfg(test)]
pub(crate) fn sealed_config() -> Config {
    use crate::config::{AliasSettings, PackageSettings, RuntimeManagerSettings};

    Config {
        workspace_dir: "workspace".into(),
        packages: PackageSettings {
            manager: "sh".into(),
            ..PackageSettings::default()
        },
        runtime_manager: RuntimeManagerSettings {
            rc_file: ".zshrc".into(),
            ..RuntimeManagerSettings::default()
        },
        aliases: AliasSettings {
            profile: ".zprofile".into(),
            ..AliasSettings::default()
        },
        ..Config::default()
    }
}
