//! Build configuration
//!
//! One [`BuildConfiguration`] is assembled per invocation from CLI flags and
//! `texdock.toml`, then shared read-only by every job.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::defaults;
use crate::config::project::ProjectConfig;

/// How variants are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One variant after the other, in request order
    #[default]
    Sequential,
    /// One concurrent worker per variant
    Parallel,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// Where the artifact ends up after a successful build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Leave it in the variant directory
    #[default]
    Default,
    /// Move it to a custom path (single variant only)
    Path(PathBuf),
    /// Move it to `<root>/cv-<variant>.pdf`
    ProjectRoot,
}

/// Per-stage timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    /// Runtime liveness probes
    pub probe: Duration,
    /// Image build
    pub image_build: Duration,
    /// Container compile run
    pub run: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(defaults::PROBE_TIMEOUT_SECS),
            image_build: Duration::from_secs(defaults::IMAGE_BUILD_TIMEOUT_SECS),
            run: Duration::from_secs(defaults::RUN_TIMEOUT_SECS),
        }
    }
}

impl StageTimeouts {
    /// Timeouts from the project configuration
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            probe: config.probe_timeout(),
            image_build: config.image_build_timeout(),
            run: config.run_timeout(),
        }
    }
}

/// Settings of one build invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfiguration {
    /// Rebuild images even if they exist
    pub force_rebuild: bool,
    /// Remove auxiliary files after a build
    pub cleanup: bool,
    /// Keep process stderr for reporting
    pub verbose: bool,
    /// Fail on any warning-level diagnostic
    pub strict: bool,
    /// Artifact destination
    pub output: OutputTarget,
    /// Scheduling mode
    pub mode: ExecutionMode,
    /// Per-stage timeouts
    pub timeouts: StageTimeouts,
}

impl BuildConfiguration {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Force image rebuilds
    #[must_use]
    pub fn with_force_rebuild(mut self, force: bool) -> Self {
        self.force_rebuild = force;
        self
    }

    /// Remove auxiliary files after each build
    #[must_use]
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Keep stderr of failed processes
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Fail on warnings
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the artifact destination
    #[must_use]
    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    /// Set the scheduling mode
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Bytes of stderr kept in a failure: the tail in verbose mode, none
    /// otherwise
    pub fn stderr_limit(&self) -> usize {
        if self.verbose {
            defaults::STDERR_TAIL_LIMIT
        } else {
            0
        }
    }

    /// Set the stage timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfiguration::new();

        assert!(!config.force_rebuild);
        assert!(!config.strict);
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert_eq!(config.output, OutputTarget::Default);
        assert!(config.timeouts.image_build > config.timeouts.run);
    }

    #[test]
    fn test_builder() {
        let config = BuildConfiguration::new()
            .with_force_rebuild(true)
            .with_cleanup(true)
            .with_strict(true)
            .with_mode(ExecutionMode::Parallel)
            .with_output(OutputTarget::ProjectRoot);

        assert!(config.force_rebuild);
        assert!(config.cleanup);
        assert!(config.strict);
        assert_eq!(config.mode, ExecutionMode::Parallel);
        assert_eq!(config.output, OutputTarget::ProjectRoot);
    }

    #[test]
    fn test_stderr_kept_only_when_verbose() {
        assert_eq!(BuildConfiguration::new().stderr_limit(), 0);
        assert_eq!(
            BuildConfiguration::new().with_verbose(true).stderr_limit(),
            defaults::STDERR_TAIL_LIMIT
        );
    }

    #[test]
    fn test_timeouts_from_project_config() {
        let project = ProjectConfig::from_toml("[timeouts]\nrun_secs = 5\n").unwrap();
        let timeouts = StageTimeouts::from_config(&project);

        assert_eq!(timeouts.run, Duration::from_secs(5));
        assert_eq!(timeouts.probe, Duration::from_secs(defaults::PROBE_TIMEOUT_SECS));
    }
}
