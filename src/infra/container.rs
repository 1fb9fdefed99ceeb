//! Container runtime commands
//!
//! Builds the argument vectors for the Docker/Podman verbs texdock needs and
//! probes whether the runtime is usable. Execution goes through
//! [`ProcessRunner`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::BuildError;
use crate::infra::process::{Invocation, ProcessOutcome, ProcessRunner};

/// Mount configuration for container volumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfig {
    /// Host path to mount
    pub host_path: PathBuf,
    /// Container path to mount to
    pub container_path: PathBuf,
}

impl MountConfig {
    /// Create a new read-write mount
    pub fn new(host_path: PathBuf, container_path: PathBuf) -> Self {
        Self {
            host_path,
            container_path,
        }
    }

    /// `host:container` volume specification
    pub fn volume_spec(&self) -> String {
        format!(
            "{}:{}",
            self.host_path.display(),
            self.container_path.display()
        )
    }
}

/// Container runtime command builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRuntime {
    /// Command name or path (`docker`, `podman`, ...)
    command: String,
}

impl ContainerRuntime {
    /// Create a runtime invoking `command`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Get the command name for this runtime
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Full path of the runtime executable, if it can be found
    pub fn resolve(&self) -> Option<PathBuf> {
        which::which(&self.command).ok()
    }

    /// Liveness probe
    pub fn version(&self, timeout: Duration) -> Invocation {
        Invocation::new(&self.command, vec!["--version".to_string()], timeout)
    }

    /// Daemon availability probe
    pub fn info(&self, timeout: Duration) -> Invocation {
        Invocation::new(&self.command, vec!["info".to_string()], timeout)
    }

    /// Image existence query, prints the image id when the tag exists
    pub fn image_query(&self, tag: &str, timeout: Duration) -> Invocation {
        Invocation::new(
            &self.command,
            vec!["images".to_string(), "-q".to_string(), tag.to_string()],
            timeout,
        )
    }

    /// Image build from `descriptor` with the variant passed as `LANG`
    pub fn image_build(
        &self,
        context_dir: &Path,
        descriptor: &str,
        tag: &str,
        variant: &str,
        timeout: Duration,
    ) -> Invocation {
        Invocation::new(
            &self.command,
            vec![
                "build".to_string(),
                "--build-arg".to_string(),
                format!("LANG={variant}"),
                "-f".to_string(),
                descriptor.to_string(),
                "-t".to_string(),
                tag.to_string(),
                ".".to_string(),
            ],
            timeout,
        )
        .in_dir(context_dir)
    }

    /// Run `tag` as container `name` with one bind mount, removing the
    /// container on exit
    pub fn run(
        &self,
        tag: &str,
        name: &str,
        mount: &MountConfig,
        timeout: Duration,
    ) -> Invocation {
        Invocation::new(
            &self.command,
            vec![
                "run".to_string(),
                "--rm".to_string(),
                "-v".to_string(),
                mount.volume_spec(),
                "--name".to_string(),
                name.to_string(),
                tag.to_string(),
            ],
            timeout,
        )
    }

    /// Force-remove container `name`, stopping it if still running
    pub fn remove(&self, name: &str, timeout: Duration) -> Invocation {
        Invocation::new(
            &self.command,
            vec!["rm".to_string(), "-f".to_string(), name.to_string()],
            timeout,
        )
    }

    /// Check that the runtime is installed and its daemon answers
    ///
    /// `info` may exit non-zero on warnings; any recognizable output is
    /// accepted.
    pub async fn ensure_available(
        &self,
        runner: &dyn ProcessRunner,
        timeout: Duration,
    ) -> Result<(), BuildError> {
        let unavailable = |reason: String| BuildError::RuntimeUnavailable {
            runtime: self.command.clone(),
            reason,
        };

        match runner.run(&self.version(timeout)).await {
            ProcessOutcome::Completed { exit_code: 0, .. } => {}
            ProcessOutcome::Completed { exit_code, .. } => {
                return Err(unavailable(format!("version query exited with {exit_code}")));
            }
            ProcessOutcome::TimedOut { .. } => {
                return Err(unavailable("version query timed out".to_string()));
            }
            ProcessOutcome::LaunchFailed { cause } => return Err(unavailable(cause)),
        }

        match runner.run(&self.info(timeout)).await {
            ProcessOutcome::Completed {
                exit_code, stdout, ..
            } => {
                if exit_code == 0 || daemon_responded(&stdout) {
                    Ok(())
                } else {
                    Err(unavailable("daemon is not running".to_string()))
                }
            }
            ProcessOutcome::TimedOut { .. } => {
                Err(unavailable("daemon info timed out".to_string()))
            }
            ProcessOutcome::LaunchFailed { cause } => Err(unavailable(cause)),
        }
    }
}

impl Default for ContainerRuntime {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_RUNTIME)
    }
}

/// Whether `info` output looks like a runtime answering
fn daemon_responded(stdout: &str) -> bool {
    stdout.contains("Client:") || stdout.contains("Server:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedRunner;

    #[test]
    fn test_run_args() {
        let runtime = ContainerRuntime::new("docker");
        let mount = MountConfig::new(PathBuf::from("/work/cv-en"), PathBuf::from("/cv/output"));
        let invocation =
            runtime.run("cv-builder-en", "cv-builder-en-42", &mount, Duration::from_secs(5));

        assert_eq!(invocation.program, "docker");
        assert_eq!(
            invocation.args,
            vec![
                "run",
                "--rm",
                "-v",
                "/work/cv-en:/cv/output",
                "--name",
                "cv-builder-en-42",
                "cv-builder-en"
            ]
        );
    }

    #[test]
    fn test_remove_args() {
        let invocation =
            ContainerRuntime::new("docker").remove("cv-builder-en-42", Duration::from_secs(5));
        assert_eq!(invocation.args, vec!["rm", "-f", "cv-builder-en-42"]);
    }

    #[test]
    fn test_image_build_args() {
        let runtime = ContainerRuntime::new("podman");
        let invocation = runtime.image_build(
            Path::new("/work"),
            "Dockerfile.cv",
            "cv-builder-fr",
            "fr",
            Duration::from_secs(5),
        );

        assert_eq!(invocation.program, "podman");
        assert_eq!(
            invocation.args,
            vec![
                "build",
                "--build-arg",
                "LANG=fr",
                "-f",
                "Dockerfile.cv",
                "-t",
                "cv-builder-fr",
                "."
            ]
        );
        assert_eq!(invocation.cwd, Some(PathBuf::from("/work")));
    }

    #[test]
    fn test_daemon_responded() {
        assert!(daemon_responded("Client:\n Version: 24.0"));
        assert!(daemon_responded("Server:\n Containers: 0"));
        assert!(!daemon_responded(""));
    }

    #[test]
    fn test_resolve_unknown_runtime() {
        let runtime = ContainerRuntime::new("texdock-no-such-runtime");
        assert_eq!(runtime.resolve(), None);
    }

    #[tokio::test]
    async fn test_available_when_info_warns_with_output() {
        let runner = ScriptedRunner::new()
            .on("--version", ScriptedRunner::ok("Docker version 24.0.7"))
            .on("info", ScriptedRunner::exit(1, "Client:\n Context: default"));

        let result = ContainerRuntime::new("docker")
            .ensure_available(&runner, Duration::from_secs(1))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_when_daemon_silent() {
        let runner = ScriptedRunner::new()
            .on("--version", ScriptedRunner::ok("Docker version 24.0.7"))
            .on("info", ScriptedRunner::exit(1, ""));

        let result = ContainerRuntime::new("docker")
            .ensure_available(&runner, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(BuildError::RuntimeUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_unavailable_when_not_installed() {
        let runner = ScriptedRunner::new().on(
            "--version",
            ProcessOutcome::LaunchFailed {
                cause: "not found".to_string(),
            },
        );

        let result = ContainerRuntime::new("docker")
            .ensure_available(&runner, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(BuildError::RuntimeUnavailable { .. })));
    }
}
