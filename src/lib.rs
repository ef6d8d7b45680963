// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bootstrap a developer machine.
//!
//! Devboot clones a set of repositories into a workspace directory, installs
//! apps through a package manager, installs a runtime version manager, and
//! adds shell aliases to the user's profile. Every step is idempotent, so
//! running devboot again only does whatever is still missing.
//!
//! # Dry Runs
//!
//! Every side effect is expressed as an [`exec::Action`] and handed to an
//! [`exec::Executor`]. A dry-run [`exec::SystemExecutor`] only logs each
//! action prefixed with `[dry-run]`, which previews the full setup without
//! touching the filesystem or spawning anything.

pub mod config;
pub mod exec;
pub mod path;
pub mod probe;
pub mod setup;
pub mod text;

pub use config::Config;
pub use exec::{Executor, SystemExecutor};
pub use setup::Setup;
