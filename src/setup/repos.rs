// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository cloning.
//!
//! Every repository of a group lands in `<workspace>/<group>/<repo>`. A
//! repository whose directory already exists is never cloned again.

use crate::{
    exec::{Action, Executor, Invocation},
    path::path_exists,
    setup::{Result, Setup},
};

use std::path::Path;
use tracing::{info, instrument};

impl<E> Setup<E>
where
    E: Executor,
{
    /// Clone all configured repository groups into the workspace.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Exec`](crate::setup::SetupError::Exec) if a
    ///   group directory cannot be created, or a clone fails.
    #[instrument(skip(self), level = "debug")]
    pub fn clone_repos(&self) -> Result<()> {
        info!("cloning repositories");
        let repos = &self.config.repos;
        for (group, names) in &repos.groups {
            let group_dir = self.config.workspace_dir.join(group);
            for name in names {
                info!("({group}) {name} --> {}", group_dir.join(name).display());
                self.clone_repo(&repos.remote_url(name), name, &group_dir)?;
            }
        }

        Ok(())
    }

    fn clone_repo(&self, url: &str, name: &str, group_dir: &Path) -> Result<()> {
        let repo_dir = group_dir.join(name);
        if path_exists(&repo_dir) {
            info!("{:?} already exists; skipping", repo_dir.display());
            return Ok(());
        }

        if !path_exists(group_dir) {
            self.executor
                .perform(Action::CreateDir(group_dir.to_path_buf()))?;
        }

        // INVARIANT: SSH may ask to confirm a host key, or for a passphrase.
        let invocation = Invocation::new("git", ["clone", url, name])
            .current_dir(group_dir)
            .interactive();
        self.executor.perform(Action::Spawn(invocation))?;

        Ok(())
    }
}
