// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Idempotent text blocks in plain text files.
//!
//! Shell profiles and rc files get configured by appending a block of text
//! to them. Each block starts with a __marker__ line. If the marker can
//! already be found somewhere in the file, then the block is considered
//! applied, and the file is left alone. Thus, applying the same block any
//! number of times yields exactly one copy of it.

use crate::{
    exec::{Action, ExecError, Executor, Performed},
    path::path_exists,
};

use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind},
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Block of text guarded by a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// Unique line that identifies the block.
    pub marker: String,

    /// Content written after the marker.
    pub text: String,
}

impl TextBlock {
    /// Construct new text block.
    pub fn new(marker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            text: text.into(),
        }
    }

    /// Render block as it should appear in the target file.
    ///
    /// Always ends with exactly one newline.
    pub fn render(&self) -> String {
        let text = self.text.trim_matches('\n');
        if text.is_empty() {
            format!("{}\n", self.marker)
        } else {
            format!("{}\n{}\n", self.marker, text)
        }
    }
}

/// State of a text block after [`ensure_text_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// Marker was already present, nothing was written.
    Present,

    /// Block was appended to the file.
    Appended,

    /// Dry run: file creation or append was only described.
    Planned,
}

/// Make sure that file exists, and contains text block exactly once.
///
/// Creates the file when missing. In dry-run mode a missing file short
/// circuits the whole operation after describing its creation, so nothing is
/// touched.
///
/// # Errors
///
/// - Return [`TextError::Exec`] if the file cannot be created or appended to.
/// - Return [`TextError::Read`] if the file cannot be scanned for the marker.
#[instrument(skip(executor, path, block), fields(marker = %block.marker), level = "debug")]
pub fn ensure_text_block(
    executor: &impl Executor,
    path: impl AsRef<Path>,
    block: &TextBlock,
) -> Result<BlockStatus> {
    let path = path.as_ref();
    info!("ensuring that file exists: {:?}", path.display());
    if !path_exists(path)
        && executor.perform(Action::CreateFile(path.into()))? == Performed::Simulated
    {
        return Ok(BlockStatus::Planned);
    }

    info!("checking if file contains marker: {:?}", block.marker);
    if file_contains(path, &block.marker)? {
        info!("file already contains marker; skipping");
        return Ok(BlockStatus::Present);
    }

    info!("adding text to file");
    let mut text = String::new();
    if !ends_with_newline(path)? {
        text.push('\n');
    }
    text.push_str(&block.render());

    match executor.perform(Action::AppendText {
        path: path.into(),
        text,
    })? {
        Performed::Simulated => Ok(BlockStatus::Planned),
        Performed::Completed => Ok(BlockStatus::Appended),
    }
}

/// Check if any line of target file contains `needle`.
///
/// # Errors
///
/// - Return [`TextError::Read`] if the file cannot be opened or read.
pub fn file_contains(path: impl AsRef<Path>, needle: &str) -> Result<bool> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| TextError::Read {
        source: err,
        path: path.into(),
    })?;

    // INVARIANT: Lines are raw bytes, so stray non-UTF-8 bytes never fail the scan.
    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(|err| TextError::Read {
            source: err,
            path: path.into(),
        })?;

        if String::from_utf8_lossy(&line).contains(needle) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Like [`file_contains`], but a missing file simply does not contain
/// anything.
///
/// # Errors
///
/// - Return [`TextError::Read`] if the file exists, but cannot be read.
pub fn file_contains_if_exists(path: impl AsRef<Path>, needle: &str) -> Result<bool> {
    match file_contains(path, needle) {
        Err(TextError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(false),
        result => result,
    }
}

/// Empty files count as ending with a newline.
fn ends_with_newline(path: &Path) -> Result<bool> {
    let content = std::fs::read(path).map_err(|err| TextError::Read {
        source: err,
        path: path.into(),
    })?;

    Ok(content.last().is_none_or(|byte| *byte == b'\n'))
}

/// Text block error types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// File could not be read while checking for its contents.
    #[error("failed to read from file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File could not be created or appended to.
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Friendly result alias :3
pub type Result<T, E = TextError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{RecordingExecutor, SystemExecutor};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    fn block() -> TextBlock {
        TextBlock::new(
            "# -- Aliases (added by devboot v1)",
            indoc! {r#"

                alias c='clear'
                alias gs='git status'
            "#},
        )
    }

    #[test]
    fn render_trims_surrounding_blank_lines() {
        let expect = indoc! {r#"
            # -- Aliases (added by devboot v1)
            alias c='clear'
            alias gs='git status'
        "#};
        assert_eq!(block().render(), expect);
    }

    #[sealed_test]
    fn applying_twice_writes_marker_once() -> anyhow::Result<()> {
        let executor = RecordingExecutor::default();

        assert_eq!(ensure_text_block(&executor, ".zprofile", &block())?, BlockStatus::Appended);
        assert_eq!(ensure_text_block(&executor, ".zprofile", &block())?, BlockStatus::Present);

        let content = std::fs::read_to_string(".zprofile")?;
        assert_eq!(content.matches("# -- Aliases (added by devboot v1)").count(), 1);
        assert_eq!(content, block().render());

        // Second invocation performed no write.
        let appends = executor
            .actions()
            .into_iter()
            .filter(|action| matches!(action, Action::AppendText { .. }))
            .count();
        assert_eq!(appends, 1);

        Ok(())
    }

    #[sealed_test]
    fn existing_content_is_preserved() -> anyhow::Result<()> {
        std::fs::write(".zprofile", "export EDITOR=vim")?;
        let executor = SystemExecutor::new(false);

        assert_eq!(ensure_text_block(&executor, ".zprofile", &block())?, BlockStatus::Appended);

        let expect = indoc! {r#"
            export EDITOR=vim
            # -- Aliases (added by devboot v1)
            alias c='clear'
            alias gs='git status'
        "#};
        assert_eq!(std::fs::read_to_string(".zprofile")?, expect);

        Ok(())
    }

    #[sealed_test]
    fn marker_anywhere_in_line_counts_as_present() -> anyhow::Result<()> {
        std::fs::write(".zprofile", "foo\n  # -- Aliases (added by devboot v1) (edited)\nbar\n")?;
        let executor = SystemExecutor::new(false);

        assert_eq!(ensure_text_block(&executor, ".zprofile", &block())?, BlockStatus::Present);
        assert_eq!(
            std::fs::read_to_string(".zprofile")?,
            "foo\n  # -- Aliases (added by devboot v1) (edited)\nbar\n"
        );

        Ok(())
    }

    #[sealed_test]
    fn dry_run_on_missing_file_touches_nothing() -> anyhow::Result<()> {
        let executor = SystemExecutor::new(true);

        assert_eq!(ensure_text_block(&executor, ".zprofile", &block())?, BlockStatus::Planned);
        assert!(!Path::new(".zprofile").exists());

        Ok(())
    }

    #[sealed_test]
    fn dry_run_on_existing_file_leaves_it_alone() -> anyhow::Result<()> {
        std::fs::write(".zprofile", "export EDITOR=vim\n")?;
        let executor = SystemExecutor::new(true);

        assert_eq!(ensure_text_block(&executor, ".zprofile", &block())?, BlockStatus::Planned);
        assert_eq!(std::fs::read_to_string(".zprofile")?, "export EDITOR=vim\n");

        Ok(())
    }

    #[sealed_test]
    fn unreadable_file_is_a_read_error() -> anyhow::Result<()> {
        std::fs::create_dir(".zprofile")?;
        let executor = SystemExecutor::new(false);

        let result = ensure_text_block(&executor, ".zprofile", &block());
        assert!(matches!(result, Err(TextError::Read { .. })));

        Ok(())
    }

    #[sealed_test]
    fn non_utf8_bytes_do_not_break_scanning() -> anyhow::Result<()> {
        std::fs::write(".zshrc", b"# caf\xe9\nexport NVM_DIR=\"$HOME/.nvm\"\n")?;
        assert!(file_contains_if_exists(".zshrc", "NVM_DIR")?);
        assert!(!file_contains(".zshrc", "PYENV_ROOT")?);

        std::fs::write(".zprofile", b"# caf\xe9\n")?;
        assert_eq!(
            ensure_text_block(&SystemExecutor::new(true), ".zprofile", &block())?,
            BlockStatus::Planned
        );
        assert_eq!(ensure_text_block(&SystemExecutor::new(false), ".zprofile", &block())?, BlockStatus::Appended);

        let mut expect = b"# caf\xe9\n".to_vec();
        expect.extend_from_slice(block().render().as_bytes());
        assert_eq!(std::fs::read(".zprofile")?, expect);

        Ok(())
    }

    #[sealed_test]
    fn missing_file_contains_nothing() -> anyhow::Result<()> {
        assert!(!file_contains_if_exists(".zshrc", "NVM_DIR")?);
        assert!(matches!(
            file_contains(".zshrc", "NVM_DIR"),
            Err(TextError::Read { .. })
        ));

        std::fs::write(".zshrc", "export NVM_DIR=\"$HOME/.nvm\"\n")?;
        assert!(file_contains_if_exists(".zshrc", "NVM_DIR")?);

        Ok(())
    }
}
