// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dry-run aware execution of side effects.
//!
//! Every mutation devboot makes to the system is modeled as an [`Action`]:
//! spawning an external command, creating a directory, creating a file, or
//! appending text to a file. Actions are handed to an [`Executor`], which
//! either performs them, or in dry-run mode only describes them. A dry run
//! thus leaves the filesystem untouched and spawns nothing.

use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    time::Duration,
};
use tracing::{debug, info};

/// External command to spawn as a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    interactive: bool,
}

impl Invocation {
    /// Construct new invocation of `program` with `args`.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            current_dir: None,
            interactive: false,
        }
    }

    /// Construct invocation from a full command line vector.
    ///
    /// The first element is the program, the rest are its arguments. Return
    /// `None` if the vector is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program, args))
    }

    /// Run invocation inside of target working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Hand the terminal over to the child process.
    ///
    /// The child inherits stdin, stdout, and stderr, so it can prompt the
    /// user for passwords, passphrases, or host key confirmation. Its output
    /// is not captured.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }
}

impl Display for Invocation {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&self.program)?;
        for arg in &self.args {
            // INVARIANT: Keep arguments with whitespace readable as one word.
            if arg.contains(char::is_whitespace) {
                write!(fmt, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(fmt, " {arg}")?;
            }
        }

        Ok(())
    }
}

/// Mutation to perform on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Spawn external command and wait for it to finish.
    Spawn(Invocation),

    /// Create directory along with any missing parents.
    CreateDir(PathBuf),

    /// Create empty file if it does not exist yet.
    CreateFile(PathBuf),

    /// Append text to end of existing file.
    AppendText { path: PathBuf, text: String },
}

impl Display for Action {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Spawn(invocation) => match invocation.working_dir() {
                Some(dir) => write!(fmt, "{invocation}  (in {})", dir.display()),
                None => write!(fmt, "{invocation}"),
            },
            Self::CreateDir(path) => write!(fmt, "mkdir -p {}", path.display()),
            Self::CreateFile(path) => write!(fmt, "touch {}", path.display()),
            Self::AppendText { path, text } => write!(
                fmt,
                "append {} line(s) to {}",
                text.lines().count(),
                path.display()
            ),
        }
    }
}

/// Outcome of an action handed to an [`Executor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performed {
    /// Action was only described, nothing happened.
    Simulated,

    /// Action was carried out.
    Completed,
}

/// Carry out actions, or pretend to.
pub trait Executor {
    /// Whether actions are only described instead of performed.
    fn is_dry_run(&self) -> bool;

    /// Perform target action.
    ///
    /// # Errors
    ///
    /// - Return [`ExecError`] if the action was attempted and failed.
    fn perform(&self, action: Action) -> Result<Performed>;
}

/// Executor acting on the real system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor {
    dry_run: bool,
}

impl SystemExecutor {
    /// Construct new system executor.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl Executor for SystemExecutor {
    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn perform(&self, action: Action) -> Result<Performed> {
        // INVARIANT: The dry-run plan is output, so log filtering never hides it.
        if self.dry_run {
            println!("[dry-run] {action}");
            return Ok(Performed::Simulated);
        }

        debug!("{action}");
        match action {
            Action::Spawn(invocation) if invocation.is_interactive() => {
                spawn_interactive(&invocation)?
            }
            Action::Spawn(invocation) => {
                let output = spawn(&invocation)?;
                if !output.is_empty() {
                    info!("{output}");
                }
            }
            Action::CreateDir(path) => create_dir(path)?,
            Action::CreateFile(path) => create_file(path)?,
            Action::AppendText { path, text } => append_text(path, text)?,
        }

        Ok(Performed::Completed)
    }
}

/// Spawn invocation, wait for it, and collect its output.
///
/// Blocks until the child exits. A spinner with the command line is shown on
/// terminals in the meantime.
fn spawn(invocation: &Invocation) -> Result<String> {
    let command = invocation.to_string();
    let style = ProgressStyle::with_template("{spinner:.green} {elapsed_precise:.green}  {msg}")?;
    let bar = ProgressBar::new_spinner().with_style(style);
    bar.set_message(command.clone());
    bar.enable_steady_tick(Duration::from_millis(100));

    let mut child = Command::new(invocation.program());
    child.args(invocation.args());
    if let Some(dir) = invocation.working_dir() {
        child.current_dir(dir);
    }
    let output = child.output();
    bar.finish_and_clear();

    let output = output.map_err(|err| ExecError::Spawn {
        source: err,
        command: command.clone(),
    })?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.trim().is_empty() {
        message.push_str(stdout.trim_end());
    }

    if !stderr.trim().is_empty() {
        if !message.is_empty() {
            message.push('\n');
        }
        message.push_str(stderr.trim_end());
    }

    if !output.status.success() {
        return Err(ExecError::Failed {
            command,
            status: output.status,
            output: message,
        });
    }

    Ok(message)
}

/// Spawn invocation with inherited stdio, and wait for it.
///
/// No spinner is drawn, so nothing gets painted over the child's prompts.
fn spawn_interactive(invocation: &Invocation) -> Result<()> {
    let command = invocation.to_string();
    let mut child = Command::new(invocation.program());
    child.args(invocation.args());
    if let Some(dir) = invocation.working_dir() {
        child.current_dir(dir);
    }

    let status = child.status().map_err(|err| ExecError::Spawn {
        source: err,
        command: command.clone(),
    })?;
    if !status.success() {
        return Err(ExecError::Failed {
            command,
            status,
            output: String::new(),
        });
    }

    Ok(())
}

fn create_dir(path: PathBuf) -> Result<()> {
    match mkdirp::mkdirp(&path) {
        Ok(Some(first)) => info!("created {}", first.display()),
        Ok(None) => debug!("{} already exists", path.display()),
        Err(err) => return Err(ExecError::CreateDir { source: err, path }),
    }

    Ok(())
}

fn create_file(path: PathBuf) -> Result<()> {
    // INVARIANT: Never truncate a file that showed up in the meantime.
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&path)
        .map_err(|err| ExecError::CreateFile { source: err, path })?;

    Ok(())
}

fn append_text(path: PathBuf, text: String) -> Result<()> {
    let mut file = match OpenOptions::new().append(true).open(&path) {
        Ok(file) => file,
        Err(err) => return Err(ExecError::Append { source: err, path }),
    };

    file.write_all(text.as_bytes())
        .map_err(|err| ExecError::Append { source: err, path })
}

/// Execution error types.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// External command could not be started.
    #[error("failed to start `{command}`")]
    Spawn {
        #[source]
        source: std::io::Error,
        command: String,
    },

    /// External command exited unsuccessfully.
    #[error("command `{command}` failed with {status}:\n{output}")]
    Failed {
        command: String,
        status: ExitStatus,
        output: String,
    },

    /// Directory could not be created.
    #[error("failed to create directory at {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File could not be created.
    #[error("failed to create file at {:?}", path.display())]
    CreateFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Text could not be appended to file.
    #[error("failed to append to file at {:?}", path.display())]
    Append {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Style template cannot be set for progress spinner.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),
}

/// Friendly result alias :3
pub type Result<T, E = ExecError> = std::result::Result<T, E>;

/// Executor double that records every action.
///
/// Filesystem actions are carried out for real, so tests should run inside of
/// a sealed working directory. Spawned commands never run and always succeed.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    actions: std::cell::RefCell<Vec<Action>>,
}

#[cfg(test)]
impl RecordingExecutor {
    pub(crate) fn actions(&self) -> Vec<Action> {
        self.actions.borrow().clone()
    }

    pub(crate) fn spawned(&self) -> Vec<String> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|action| match action {
                Action::Spawn(invocation) => Some(invocation.to_string()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Executor for RecordingExecutor {
    fn is_dry_run(&self) -> bool {
        false
    }

    fn perform(&self, action: Action) -> Result<Performed> {
        self.actions.borrow_mut().push(action.clone());
        match action {
            Action::Spawn(_) => Ok(Performed::Completed),
            action => SystemExecutor::new(false).perform(action),
        }
    }
}
