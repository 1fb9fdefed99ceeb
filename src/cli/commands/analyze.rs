//! Analyze command implementation
//!
//! Implements `texdock analyze` to run the log parser and the quality gate
//! on a log produced elsewhere.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::cli::output::{print_stats, OutputConfig};
use crate::core::log_parser::parse_log_bytes;
use crate::core::quality;

/// Execute the analyze command
pub async fn execute(log: &Path, strict: bool, output: &OutputConfig) -> Result<()> {
    let bytes = tokio::fs::read(log)
        .await
        .with_context(|| format!("Failed to read log file {}", log.display()))?;

    let verdict = quality::evaluate(parse_log_bytes(&bytes), strict);

    if output.json {
        let json_result = serde_json::json!({
            "status": if verdict.passed { "success" } else { "error" },
            "log": log,
            "strict": strict,
            "passed": verdict.passed,
            "failure": verdict.failure,
            "stats": verdict.stats,
        });
        println!("{}", serde_json::to_string_pretty(&json_result)?);
    } else {
        output.print_info(&format!("Log: {}", log.display()));
        print_stats(&verdict.stats, output);
        if verdict.passed {
            output.print_success("Quality check passed");
        }
    }

    if let Some(failure) = verdict.failure {
        bail!("Quality check failed: {failure}");
    }

    Ok(())
}
