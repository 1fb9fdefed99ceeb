//! Error types for texdock
//!
//! Domain-specific error types using thiserror.
//!
//! [`BuildError`] aborts a whole run before any job starts. [`JobFailure`]
//! is scoped to one variant and is carried inside its
//! [`JobResult`](crate::core::job::JobResult) instead of being propagated.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::core::quality::QualityFailure;

/// Project configuration file errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{}': {error}", path.display())]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{}': {error}", path.display())]
    ParseError { path: PathBuf, error: String },
}

/// Auxiliary file cleanup errors
#[derive(Error, Debug)]
pub enum CleanError {
    /// Failed to remove an auxiliary file
    #[error("Failed to remove file '{}': {error}", path.display())]
    RemoveFile { path: PathBuf, error: String },
}

/// Errors that abort a whole build run before any job starts
#[derive(Error, Debug)]
pub enum BuildError {
    /// No variant requested
    #[error("No variant requested")]
    NoVariants,

    /// Variant not in the project's variant list
    #[error("Invalid variant '{variant}': must be one of {}", allowed.join(", "))]
    InvalidVariant {
        variant: String,
        allowed: Vec<String>,
    },

    /// Same variant requested twice
    #[error("Variant '{variant}' requested more than once")]
    DuplicateVariant { variant: String },

    /// Container runtime missing or its daemon not running
    #[error("Container runtime '{runtime}' is not available: {reason}")]
    RuntimeUnavailable { runtime: String, reason: String },

    /// A single output path cannot receive several artifacts
    #[error("--output can only be used with a single variant ({count} requested)")]
    OutputOverrideConflict { count: usize },

    /// Project configuration error
    #[error(transparent)]
    Config(#[from] ProjectConfigError),
}

/// How an external process stage went wrong
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessFailure {
    /// Exited with a non-zero status
    #[error("exited with status {code}")]
    Exited { code: i32, stderr: String },

    /// Killed after exceeding its timeout
    #[error("timed out after {}s", after.as_secs())]
    TimedOut { after: Duration },

    /// Could not be started
    #[error("could not be started: {cause}")]
    LaunchFailed { cause: String },
}

impl ProcessFailure {
    /// Captured stderr, if the process ran to completion
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Exited { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}

/// Coarse failure class, used for reporting and exit summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Locally detectable misconfiguration
    Configuration,
    /// Image could not be built
    ImageBuild,
    /// Toolchain run failed or produced no usable artifact
    Compile,
    /// Toolchain succeeded but the output was judged unacceptable
    Quality,
    /// Worker crashed or the artifact could not be delivered
    Internal,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::ImageBuild => write!(f, "image build"),
            Self::Compile => write!(f, "compile"),
            Self::Quality => write!(f, "quality"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Reason a single variant's job failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobFailure {
    /// Variant source directory absent
    #[error("Variant directory not found: {}", path.display())]
    MissingSourceDir { path: PathBuf },

    /// Primary document absent
    #[error("Document not found: {}", path.display())]
    MissingDocument { path: PathBuf },

    /// Image build descriptor absent
    #[error("Build descriptor not found: {}", path.display())]
    MissingDescriptor { path: PathBuf },

    /// Image build failed
    #[error("Failed to build image '{tag}': {cause}")]
    ImageBuild { tag: String, cause: ProcessFailure },

    /// Container run failed
    #[error("Compilation failed: {cause}")]
    Compile { cause: ProcessFailure },

    /// Container exited zero but produced no artifact
    #[error("Compilation succeeded but artifact not found at {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// Container exited zero but the artifact is empty
    #[error("Compilation succeeded but artifact is empty: {}", path.display())]
    EmptyArtifact { path: PathBuf },

    /// Quality gate rejected the log
    #[error("Quality check failed: {0}")]
    Quality(QualityFailure),

    /// Moving the artifact to its output location failed
    #[error("Failed to deliver artifact to '{}': {error}", path.display())]
    Delivery { path: PathBuf, error: String },

    /// The worker running the job crashed
    #[error("Build worker crashed: {message}")]
    Crashed { message: String },
}

impl JobFailure {
    /// Failure class of this failure
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::MissingSourceDir { .. }
            | Self::MissingDocument { .. }
            | Self::MissingDescriptor { .. } => FailureCategory::Configuration,
            Self::ImageBuild { .. } => FailureCategory::ImageBuild,
            Self::Compile { .. } | Self::MissingArtifact { .. } | Self::EmptyArtifact { .. } => {
                FailureCategory::Compile
            }
            Self::Quality(_) => FailureCategory::Quality,
            Self::Delivery { .. } | Self::Crashed { .. } => FailureCategory::Internal,
        }
    }

    /// Stderr captured from the failing process, if any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ImageBuild { cause, .. } | Self::Compile { cause } => cause.stderr(),
            _ => None,
        }
    }
}
