// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! App installation through the package manager.

use crate::{
    config::PackageSettings,
    exec::{Action, Executor, Invocation},
    probe::is_command_available,
    setup::{Result, Setup},
    text::file_contains_if_exists,
};

use tracing::{info, instrument};

impl<E> Setup<E>
where
    E: Executor,
{
    /// Install package manager, apps, and runtime version manager.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Exec`](crate::setup::SetupError::Exec) if an
    ///   installation fails.
    /// - Return [`SetupError::Text`](crate::setup::SetupError::Text) if the
    ///   runtime manager's rc file cannot be read.
    #[instrument(skip(self), level = "debug")]
    pub fn install_apps(&self) -> Result<()> {
        info!("installing apps");
        self.ensure_package_manager()?;
        self.install_packages()?;
        self.ensure_runtime_manager()?;

        Ok(())
    }

    /// Install the package manager unless it is already available.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError`](crate::setup::SetupError) if the installer fails.
    pub fn ensure_package_manager(&self) -> Result<()> {
        let packages = &self.config.packages;
        info!("checking if {} is installed", packages.manager);
        if is_command_available(&packages.manager) {
            info!("{} already installed; skipping", packages.manager);
            return Ok(());
        }

        info!("{} not installed", packages.manager);
        self.run_installer(&packages.manager, &packages.installer)?;
        info!("{} installed", packages.manager);

        Ok(())
    }

    /// Install every configured app in order.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Exec`](crate::setup::SetupError::Exec) on the
    ///   first app that fails to install.
    pub fn install_packages(&self) -> Result<()> {
        let packages = &self.config.packages;
        info!("installing apps via {}", packages.manager);
        for app in &packages.apps {
            info!("{app}");
            self.executor
                .perform(Action::Spawn(install_invocation(packages, app)))?;
        }

        Ok(())
    }

    /// Check if runtime version manager registered itself in its rc file.
    ///
    /// A missing rc file means the runtime manager is not installed.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Text`](crate::setup::SetupError::Text) if the
    ///   rc file exists, but cannot be read.
    pub fn is_runtime_manager_installed(&self) -> Result<bool> {
        let runtime = &self.config.runtime_manager;
        Ok(file_contains_if_exists(&runtime.rc_file, &runtime.marker)?)
    }

    /// Install runtime version manager unless it is already installed.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError`](crate::setup::SetupError) if the rc file cannot
    ///   be read, or the installer fails.
    pub fn ensure_runtime_manager(&self) -> Result<()> {
        let runtime = &self.config.runtime_manager;
        info!("checking if {} is installed", runtime.name);
        if self.is_runtime_manager_installed()? {
            info!("{} already installed; skipping", runtime.name);
            return Ok(());
        }

        info!("{} not installed", runtime.name);
        self.run_installer(&runtime.name, &runtime.installer)?;
        info!("{} installed", runtime.name);

        Ok(())
    }
}

/// Build package manager invocation that installs `app`.
///
/// Caskless apps are installed without the variant flag.
pub fn install_invocation(packages: &PackageSettings, app: &str) -> Invocation {
    let mut args = vec!["install"];
    if !packages.is_caskless(app) {
        args.push(packages.variant_flag.as_str());
    }
    args.push(app);

    Invocation::new(packages.manager.as_str(), args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{exec::RecordingExecutor, setup::sealed_config};

    use sealed_test::prelude::*;
    use simple_test_case::test_case;

    #[test_case("sops", "brew install sops"; "caskless app omits variant flag")]
    #[test_case("obs", "brew install --cask obs"; "regular app uses variant flag")]
    #[test_case("firefox", "brew install --cask firefox"; "unlisted app uses variant flag")]
    #[test]
    fn install_invocation_variant(app: &str, expect: &str) {
        let packages = PackageSettings::default();
        assert_eq!(install_invocation(&packages, app).to_string(), expect);
    }

    #[test]
    fn available_package_manager_is_not_reinstalled() -> anyhow::Result<()> {
        let setup = Setup::new(sealed_config(), RecordingExecutor::default());
        setup.ensure_package_manager()?;

        assert_eq!(setup.executor.actions(), Vec::new());

        Ok(())
    }

    #[test]
    fn missing_package_manager_is_installed() -> anyhow::Result<()> {
        let mut config = sealed_config();
        config.packages.manager = "devboot-surely-not-a-real-command".into();
        config.packages.installer = vec!["install-it".into(), "--now".into()];
        let setup = Setup::new(config, RecordingExecutor::default());
        setup.ensure_package_manager()?;

        assert_eq!(setup.executor.spawned(), vec!["install-it --now"]);

        Ok(())
    }

    #[sealed_test]
    fn installed_runtime_manager_is_detected() -> anyhow::Result<()> {
        std::fs::write(".zshrc", "export PATH=/usr/bin\nexport NVM_DIR=\"$HOME/.nvm\"\n")?;
        let setup = Setup::new(sealed_config(), RecordingExecutor::default());

        assert!(setup.is_runtime_manager_installed()?);
        setup.ensure_runtime_manager()?;
        assert_eq!(setup.executor.actions(), Vec::new());

        Ok(())
    }

    #[sealed_test]
    fn missing_runtime_manager_is_installed() -> anyhow::Result<()> {
        std::fs::write(".zshrc", "export PATH=/usr/bin\n")?;
        let setup = Setup::new(sealed_config(), RecordingExecutor::default());

        assert!(!setup.is_runtime_manager_installed()?);
        setup.ensure_runtime_manager()?;
        assert_eq!(
            setup.executor.spawned(),
            vec!["/bin/bash -c 'curl -o- https://raw.githubusercontent.com/nvm-sh/nvm/v0.39.3/install.sh | bash'"]
        );

        Ok(())
    }

    #[sealed_test]
    fn unreadable_rc_file_is_an_error() -> anyhow::Result<()> {
        std::fs::create_dir(".zshrc")?;
        let setup = Setup::new(sealed_config(), RecordingExecutor::default());

        assert!(setup.ensure_runtime_manager().is_err());
        assert_eq!(setup.executor.actions(), Vec::new());

        Ok(())
    }
}
