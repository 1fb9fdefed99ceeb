//! External process execution
//!
//! Runs a command with a bounded execution time and reports the outcome as a
//! [`ProcessOutcome`] value. A non-zero exit is a normal outcome; only the
//! runner itself failing to start the program is reported as
//! [`ProcessOutcome::LaunchFailed`].
//!
//! This is the only place in the crate that spawns OS processes.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::ProcessFailure;

/// A command to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory, inherited when `None`
    pub cwd: Option<PathBuf>,
    /// Maximum execution time
    pub timeout: Duration,
    /// Capture stdout/stderr instead of discarding them
    pub capture_output: bool,
}

impl Invocation {
    /// Create an invocation capturing output
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            timeout,
            capture_output: true,
        }
    }

    /// Set the working directory
    #[must_use]
    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Capture output streams or discard them
    #[must_use]
    pub fn capturing(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Command line for diagnostics
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of running an external process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process ran to completion (any exit code)
    Completed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// The process was killed after exceeding its timeout
    TimedOut { after: Duration },
    /// The process could not be started
    LaunchFailed { cause: String },
}

impl ProcessOutcome {
    /// Whether the process completed with exit code 0
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Completed { exit_code: 0, .. })
    }

    /// Convert into a failure, keeping at most `stderr_limit` trailing bytes
    /// of stderr. Returns `None` for a successful run.
    pub fn into_failure(self, stderr_limit: usize) -> Option<ProcessFailure> {
        match self {
            Self::Completed { exit_code: 0, .. } => None,
            Self::Completed {
                exit_code, stderr, ..
            } => Some(ProcessFailure::Exited {
                code: exit_code,
                stderr: tail(&stderr, stderr_limit).to_string(),
            }),
            Self::TimedOut { after } => Some(ProcessFailure::TimedOut { after }),
            Self::LaunchFailed { cause } => Some(ProcessFailure::LaunchFailed { cause }),
        }
    }
}

/// Last `limit` bytes of `text`, cut on a char boundary
pub fn tail(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut start = text.len() - limit;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Executes external commands
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the invocation to completion, timeout, or launch failure
    async fn run(&self, invocation: &Invocation) -> ProcessOutcome;
}

/// [`ProcessRunner`] backed by real OS processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, invocation: &Invocation) -> ProcessOutcome {
        tracing::debug!("Running: {}", invocation.display());

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        if invocation.capture_output {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ProcessOutcome::LaunchFailed {
                    cause: format!("{}: {e}", invocation.program),
                }
            }
        };

        // Dropping the `wait_with_output` future on timeout drops the child,
        // which kills it.
        match tokio::time::timeout(invocation.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => ProcessOutcome::Completed {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Ok(Err(e)) => ProcessOutcome::LaunchFailed {
                cause: format!("{}: {e}", invocation.program),
            },
            Err(_) => {
                tracing::warn!(
                    "'{}' timed out after {}s, killed",
                    invocation.display(),
                    invocation.timeout.as_secs()
                );
                ProcessOutcome::TimedOut {
                    after: invocation.timeout,
                }
            }
        }
    }
}
