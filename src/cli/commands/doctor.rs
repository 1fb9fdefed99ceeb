//! CLI command for `texdock doctor`

use anyhow::{bail, Result};
use std::path::Path;

use crate::cli::output::{status, OutputConfig};
use crate::core::doctor::{run_doctor, Check, DoctorReport, Severity, Verdict};
use crate::infra::process::SystemProcessRunner;

/// Execute the doctor command
pub async fn execute(project_dir: &Path, runtime: Option<&str>, output: &OutputConfig) -> Result<()> {
    let spinner = output.spinner("Checking environment...");
    let report = run_doctor(&SystemProcessRunner, project_dir, runtime).await;
    spinner.finish_and_clear();

    let verdict = report.verdict();

    if output.json {
        let document = serde_json::json!({
            "status": verdict,
            "passed": report.passed(),
            "total": report.checks.len(),
            "checks": report.checks,
            "config_issues": report.config_issues,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else if output.quiet {
        for check in report.blocking() {
            output.print_error(&format!("Failed: {}", check.name));
        }
    } else {
        print_report(&report, verdict, output);
    }

    if verdict == Verdict::Broken {
        bail!("Environment is not ready to build. Run 'texdock doctor' for details.");
    }
    Ok(())
}

fn print_check(check: &Check, output: &OutputConfig) {
    let optional = match check.severity {
        Severity::Required => "",
        Severity::Optional => " [optional]",
    };

    if check.passed {
        let version = check.version.as_ref().map(|v| format!(" (v{v})")).unwrap_or_default();
        println!("  {} {}{version}{optional}", status::SUCCESS, check.name);
        return;
    }

    println!("  {} {}{optional}", status::ERROR, check.name);
    if let Some(problem) = &check.problem {
        output.print_detail(&format!("  {problem}"));
    }
    if let Some(hint) = &check.hint {
        output.print_detail(&format!("  Hint: {hint}"));
    }
}

fn print_report(report: &DoctorReport, verdict: Verdict, output: &OutputConfig) {
    output.print_info("Checking build environment...");
    println!();
    for check in &report.checks {
        print_check(check, output);
    }

    if !report.config_issues.is_empty() {
        println!();
        output.print_warning("Configuration issues:");
        for issue in &report.config_issues {
            output.print_detail(&format!("• {issue}"));
        }
    }

    println!();
    let tally = format!("{}/{}", report.passed(), report.checks.len());
    match verdict {
        Verdict::Healthy => output.print_success(&format!("All checks passed ({tally})")),
        Verdict::Degraded => output.print_warning(&format!(
            "{tally} checks passed; only the available variants can be built"
        )),
        Verdict::Broken => output.print_error(&format!("{tally} checks passed")),
    }
}
