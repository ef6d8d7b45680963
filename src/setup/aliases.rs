// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{
    exec::Executor,
    setup::{Result, Setup},
    text::{ensure_text_block, BlockStatus, TextBlock},
};

use tracing::{info, instrument};

impl<E> Setup<E>
where
    E: Executor,
{
    /// Append alias block to the user's profile unless already present.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Text`](crate::setup::SetupError::Text) if the
    ///   profile cannot be read, created, or appended to.
    #[instrument(skip(self), level = "debug")]
    pub fn ensure_aliases(&self) -> Result<BlockStatus> {
        let aliases = &self.config.aliases;
        info!("ensuring aliases are added to {:?}", aliases.profile.display());
        let block = TextBlock::new(aliases.marker.as_str(), aliases.text.as_str());
        let status = ensure_text_block(&self.executor, &aliases.profile, &block)?;
        if status == BlockStatus::Appended {
            info!("aliases added");
        }

        Ok(status)
    }
}
