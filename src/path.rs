// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for files and directories that setup
//! needs to inspect or create.

use std::path::{Path, PathBuf};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Construct path relative to user's home directory.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn path_from_home_dir(relative: impl AsRef<Path>) -> Result<PathBuf> {
    home_dir().map(|home| home.join(relative))
}

/// Determine default absolute path to configuration file.
///
/// Uses `$XDG_CONFIG_HOME/devboot/config.toml` when `XDG_CONFIG_HOME` holds
/// an absolute path, and `~/.config/devboot/config.toml` otherwise. The same
/// rule applies on every platform, macOS included. Does not check if the path
/// returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if `XDG_CONFIG_HOME` is unusable, and the home
///   directory cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_path() -> Result<PathBuf> {
    // INVARIANT: Relative values of XDG_CONFIG_HOME are invalid, and ignored.
    let config_dir = match std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        Some(path) if path.is_absolute() => path,
        _ => path_from_home_dir(".config")?,
    };

    Ok(config_dir.join("devboot").join("config.toml"))
}

/// Check if anything exists at target path.
///
/// Broken symlinks and paths that cannot be inspected due to permissions count
/// as missing.
pub fn path_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().try_exists().unwrap_or(false)
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
