// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Command availability checks.
//!
//! An executable counts as available if either a direct `PATH` lookup finds
//! it, or the shell's own `command -v` builtin resolves it. The second
//! strategy catches shell builtins and anything the user's shell can see that
//! a plain `PATH` search cannot.

use std::process::Command;
use tracing::{debug, instrument};

/// Check if executable can be located in current environment.
///
/// Tries [`available_via_path_lookup`] first, then falls back to
/// [`available_via_shell_lookup`]. Not finding the executable is a normal
/// outcome, not an error.
#[instrument(level = "debug")]
pub fn is_command_available(name: &str) -> bool {
    available_via_path_lookup(name) || available_via_shell_lookup(name)
}

/// Locate executable through direct `PATH` resolution.
pub fn available_via_path_lookup(name: &str) -> bool {
    match which::which(name) {
        Ok(path) => {
            debug!("({})", path.display());
            true
        }
        Err(error) => {
            debug!("path lookup of {name:?} failed: {error}");
            false
        }
    }
}

/// Locate executable through the shell's `command -v` builtin.
///
/// The name is passed as a positional argument, never interpolated into the
/// shell script.
pub fn available_via_shell_lookup(name: &str) -> bool {
    let output = match Command::new("sh")
        .args(["-c", "command -v \"$1\"", "sh", name])
        .output()
    {
        Ok(output) => output,
        Err(error) => {
            debug!("shell lookup of {name:?} could not run: {error}");
            return false;
        }
    };

    let resolved = String::from_utf8_lossy(&output.stdout);
    let resolved = resolved.trim();
    if !resolved.is_empty() {
        debug!("({resolved})");
    }

    output.status.success()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOGUS: &str = "devboot-surely-not-a-real-command";

    #[test]
    fn available_command_is_found() {
        assert!(is_command_available("sh"));
        assert!(available_via_path_lookup("sh"));
        assert!(available_via_shell_lookup("sh"));
    }

    #[test]
    fn shell_builtin_is_found() {
        assert!(available_via_shell_lookup("cd"));
        assert!(is_command_available("cd"));
    }

    #[test]
    fn missing_command_is_not_found() {
        assert!(!available_via_path_lookup(BOGUS));
        assert!(!available_via_shell_lookup(BOGUS));
        assert!(!is_command_available(BOGUS));
    }
}
