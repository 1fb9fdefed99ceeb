//! Environment checks for `texdock doctor`
//!
//! Probes the container runtime and the project layout. Each probe yields a
//! [`Check`]; a failed required check means no variant can be built, a
//! failed optional check only affects some variants.

use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::config::project::ProjectConfig;
use crate::core::variant::{BuildVariant, ProjectLayout};
use crate::infra::container::ContainerRuntime;
use crate::infra::process::{ProcessOutcome, ProcessRunner};

/// How much a failing check matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No variant can be built
    Required,
    /// Only some variants are affected
    Optional,
}

/// Outcome of one probe
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub severity: Severity,
    pub passed: bool,
    /// Version reported by the probed tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    /// What to do about the problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Check {
    fn ok(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity,
            passed: true,
            version: None,
            problem: None,
            hint: None,
        }
    }

    fn failed(
        name: impl Into<String>,
        severity: Severity,
        problem: impl Into<String>,
        hint: &str,
    ) -> Self {
        Self {
            name: name.into(),
            severity,
            passed: false,
            version: None,
            problem: Some(problem.into()),
            hint: Some(hint.to_string()),
        }
    }

    #[must_use]
    fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Failed and required
    pub fn is_blocking(&self) -> bool {
        !self.passed && self.severity == Severity::Required
    }
}

/// Overall state of the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every check passed
    Healthy,
    /// Only optional checks failed
    Degraded,
    /// A required check failed or the project file is unusable
    Broken,
}

/// Checks gathered by [`run_doctor`]
#[derive(Debug, Default, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<Check>,
    /// Problems with `texdock.toml`
    pub config_issues: Vec<String>,
}

impl DoctorReport {
    pub fn push(&mut self, check: Check) {
        self.checks.push(check);
    }

    /// Failed required checks, in probe order
    pub fn blocking(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| c.is_blocking())
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn verdict(&self) -> Verdict {
        if self.blocking().next().is_some() || !self.config_issues.is_empty() {
            Verdict::Broken
        } else if self.checks.iter().all(|c| c.passed) {
            Verdict::Healthy
        } else {
            Verdict::Degraded
        }
    }
}

/// First dotted version number in `output`
fn extract_version(output: &str) -> Option<String> {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION
        .get_or_init(|| {
            Regex::new(r"v?(\d+\.\d+(?:\.\d+)?(?:-\w+)?)").expect("version pattern is valid")
        })
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check the runtime binary answers `--version`
pub async fn check_runtime(
    runner: &dyn ProcessRunner,
    runtime: &ContainerRuntime,
    timeout: Duration,
) -> Check {
    let name = format!("Container runtime ({})", runtime.command());
    match runner.run(&runtime.version(timeout)).await {
        ProcessOutcome::Completed {
            exit_code: 0,
            stdout,
            ..
        } => Check::ok(name, Severity::Required).with_version(extract_version(&stdout)),
        ProcessOutcome::Completed { exit_code, .. } => Check::failed(
            name,
            Severity::Required,
            format!("'{} --version' exited with {exit_code}", runtime.command()),
            "Reinstall the container runtime",
        ),
        ProcessOutcome::TimedOut { .. } => Check::failed(
            name,
            Severity::Required,
            "Version query timed out",
            "Check that the runtime is not hanging",
        ),
        ProcessOutcome::LaunchFailed { cause } => {
            let problem = match runtime.resolve() {
                Some(path) => format!("{} could not be started: {cause}", path.display()),
                None => format!("{} not found in PATH", runtime.command()),
            };
            Check::failed(
                name,
                Severity::Required,
                problem,
                "Install Docker from https://docs.docker.com/get-docker/ or pass --runtime",
            )
        }
    }
}

/// Check the runtime daemon answers `info`
pub async fn check_daemon(
    runner: &dyn ProcessRunner,
    runtime: &ContainerRuntime,
    timeout: Duration,
) -> Check {
    match runtime.ensure_available(runner, timeout).await {
        Ok(()) => Check::ok("Container daemon", Severity::Required),
        Err(e) => Check::failed(
            "Container daemon",
            Severity::Required,
            e.to_string(),
            "Start the daemon (e.g. 'systemctl start docker' or Docker Desktop)",
        ),
    }
}

/// Check the image build descriptor exists
pub fn check_descriptor(layout: &ProjectLayout) -> Check {
    let path = layout.descriptor_path();
    let name = format!("Build descriptor ({})", layout.descriptor());
    if path.is_file() {
        Check::ok(name, Severity::Required)
    } else {
        Check::failed(
            name,
            Severity::Required,
            format!("{} not found", path.display()),
            "Create the descriptor in the project root or set [container] descriptor",
        )
    }
}

/// Check a variant directory and its document exist
///
/// Optional, since a project may not carry every configured variant.
pub fn check_variant(layout: &ProjectLayout, variant: &BuildVariant) -> Check {
    let name = format!("Variant {variant}");
    let dir = layout.variant_dir(variant);
    let document = layout.document_path(variant);

    if !dir.is_dir() {
        Check::failed(
            name,
            Severity::Optional,
            format!("{} not found", dir.display()),
            "Create the variant directory or remove it from [project] variants",
        )
    } else if !document.is_file() {
        Check::failed(
            name,
            Severity::Optional,
            format!("{} not found", document.display()),
            "Add the primary document to the variant directory",
        )
    } else {
        Check::ok(name, Severity::Optional)
    }
}

/// Run all doctor checks for the project at `project_dir`
///
/// An unreadable `texdock.toml` is reported as a configuration issue and the
/// defaults are used for the remaining checks.
pub async fn run_doctor(
    runner: &dyn ProcessRunner,
    project_dir: &Path,
    runtime_override: Option<&str>,
) -> DoctorReport {
    let mut report = DoctorReport::default();

    let config = match ProjectConfig::load(project_dir) {
        Ok(config) => config,
        Err(e) => {
            report.config_issues.push(e.to_string());
            ProjectConfig::default()
        }
    };
    let runtime = ContainerRuntime::new(runtime_override.unwrap_or(config.runtime()));
    let layout = ProjectLayout::new(project_dir, &config);
    let timeout = config.probe_timeout();

    let runtime_check = check_runtime(runner, &runtime, timeout).await;
    let runtime_found = runtime_check.passed;
    report.push(runtime_check);
    if runtime_found {
        report.push(check_daemon(runner, &runtime, timeout).await);
    }

    report.push(check_descriptor(&layout));
    for name in config.variants() {
        report.push(check_variant(&layout, &BuildVariant::new(name)));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_descriptor, create_variant, ScriptedRunner};
    use tempfile::TempDir;

    fn healthy_runner() -> ScriptedRunner {
        ScriptedRunner::new()
            .on("--version", ScriptedRunner::ok("Docker version 24.0.7, build afdd53b"))
            .on("info", ScriptedRunner::ok("Client:\nServer:\n"))
    }

    #[test]
    fn test_verdict() {
        let mut report = DoctorReport::default();
        report.push(Check::ok("runtime", Severity::Required));
        assert_eq!(report.verdict(), Verdict::Healthy);

        report.push(Check::failed("Variant fr", Severity::Optional, "missing", "create it"));
        assert_eq!(report.verdict(), Verdict::Degraded);
        assert_eq!(report.blocking().count(), 0);

        report.push(Check::failed("descriptor", Severity::Required, "missing", "create it"));
        assert_eq!(report.verdict(), Verdict::Broken);
        assert_eq!(report.passed(), 1);
        let blocking: Vec<&str> = report.blocking().map(|c| c.name.as_str()).collect();
        assert_eq!(blocking, ["descriptor"]);
    }

    #[test]
    fn test_config_issue_breaks_report() {
        let mut report = DoctorReport::default();
        report.push(Check::ok("runtime", Severity::Required));
        report.config_issues.push("bad toml".to_string());

        assert_eq!(report.verdict(), Verdict::Broken);
    }

    #[test]
    fn test_check_serializes_without_empty_fields() {
        let json = serde_json::to_value(Check::ok("daemon", Severity::Required)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "daemon", "severity": "required", "passed": true})
        );
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version("Docker version 24.0.7, build afdd53b"),
            Some("24.0.7".to_string())
        );
        assert_eq!(extract_version("podman version 4.9.3"), Some("4.9.3".to_string()));
        assert_eq!(extract_version("no digits here"), None);
    }

    #[tokio::test]
    async fn test_healthy_project() {
        let dir = TempDir::new().unwrap();
        create_descriptor(dir.path());
        create_variant(dir.path(), "en");
        create_variant(dir.path(), "fr");

        let report = run_doctor(&healthy_runner(), dir.path(), None).await;

        assert_eq!(report.verdict(), Verdict::Healthy, "{report:?}");
        assert_eq!(report.checks[0].version.as_deref(), Some("24.0.7"));
    }

    #[tokio::test]
    async fn test_missing_runtime_skips_daemon_check() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::new().on(
            "--version",
            ProcessOutcome::LaunchFailed {
                cause: "No such file or directory".to_string(),
            },
        );

        let report = run_doctor(&runner, dir.path(), Some("podman")).await;

        assert_eq!(report.verdict(), Verdict::Broken);
        assert!(report.checks[0].name.contains("podman"));
        assert!(runner.calls_to("info").is_empty());
    }

    #[tokio::test]
    async fn test_missing_variant_is_optional() {
        let dir = TempDir::new().unwrap();
        create_descriptor(dir.path());
        create_variant(dir.path(), "en");

        let report = run_doctor(&healthy_runner(), dir.path(), None).await;

        assert_eq!(report.verdict(), Verdict::Degraded);
        let fr = report.checks.iter().find(|c| c.name == "Variant fr").unwrap();
        assert!(!fr.passed);
        assert_eq!(fr.severity, Severity::Optional);
    }

    #[tokio::test]
    async fn test_invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("texdock.toml"), "[project\n").unwrap();

        let report = run_doctor(&healthy_runner(), dir.path(), None).await;

        assert_eq!(report.config_issues.len(), 1);
        assert!(report.config_issues[0].contains("texdock.toml"));
    }
}
