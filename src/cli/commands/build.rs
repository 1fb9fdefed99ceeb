//! Build command implementation
//!
//! Implements `texdock build` to compile document variants in containers.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::commands::requested_variants;
use crate::cli::output::{format_duration, print_stats, OutputConfig};
use crate::config::project::ProjectConfig;
use crate::core::config::{BuildConfiguration, ExecutionMode, OutputTarget, StageTimeouts};
use crate::core::job::{JobContext, JobResult};
use crate::core::orchestrator::{BuildOrchestrator, BuildSummary};
use crate::core::variant::ProjectLayout;
use crate::infra::container::ContainerRuntime;
use crate::infra::process::SystemProcessRunner;

/// Build options
#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Requested variants
    pub variants: Vec<String>,
    /// Build every configured variant
    pub all: bool,
    /// Build concurrently
    pub parallel: bool,
    /// Custom artifact path
    pub output: Option<PathBuf>,
    /// Move artifacts to the project root
    pub move_to_root: bool,
    /// Rebuild images
    pub rebuild: bool,
    /// Remove auxiliary files
    pub clean: bool,
    /// Strict quality gate
    pub strict: bool,
    /// Runtime command override
    pub runtime: Option<String>,
    /// Compile timeout override in seconds
    pub run_timeout: Option<u64>,
    /// Image build timeout override in seconds
    pub build_timeout: Option<u64>,
}

impl BuildOptions {
    fn output_target(&self) -> OutputTarget {
        match (&self.output, self.move_to_root) {
            (Some(path), _) => OutputTarget::Path(path.clone()),
            (None, true) => OutputTarget::ProjectRoot,
            (None, false) => OutputTarget::Default,
        }
    }

    fn mode(&self) -> ExecutionMode {
        if self.parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        }
    }

    fn timeouts(&self, config: &ProjectConfig) -> StageTimeouts {
        let mut timeouts = StageTimeouts::from_config(config);
        if let Some(secs) = self.run_timeout {
            timeouts.run = Duration::from_secs(secs);
        }
        if let Some(secs) = self.build_timeout {
            timeouts.image_build = Duration::from_secs(secs);
        }
        timeouts
    }

    /// Build configuration from the options and the project settings
    pub fn configuration(&self, config: &ProjectConfig, verbose: bool) -> BuildConfiguration {
        BuildConfiguration::new()
            .with_force_rebuild(self.rebuild)
            .with_cleanup(self.clean)
            .with_verbose(verbose)
            .with_strict(self.strict)
            .with_output(self.output_target())
            .with_mode(self.mode())
            .with_timeouts(self.timeouts(config))
    }
}

/// Execute the build command
pub async fn execute(project_dir: &Path, options: BuildOptions, output: &OutputConfig) -> Result<()> {
    let project = ProjectConfig::load(project_dir).context("Failed to load project configuration")?;

    let requested = requested_variants(options.variants.clone(), options.all, &project);
    let config = options.configuration(&project, output.is_verbose());
    let runtime = ContainerRuntime::new(options.runtime.as_deref().unwrap_or(project.runtime()));

    print_configuration(&requested, &config, &runtime, output);

    let ctx = JobContext::new(
        Arc::new(SystemProcessRunner),
        runtime,
        ProjectLayout::new(project_dir, &project),
        config,
    );
    let orchestrator = BuildOrchestrator::new(ctx, project.variants());

    let spinner = output.spinner(&format!("Building {}...", requested.join(", ")));
    let result = orchestrator.run(&requested).await;
    spinner.finish_and_clear();
    let summary = result?;

    if output.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary_json(&summary, orchestrator.context()))?
        );
    } else {
        for result in summary.ordered() {
            print_result(result, output);
        }
        print_summary(&summary, output);
    }

    if !summary.all_succeeded() {
        let failed: Vec<String> = summary
            .failed()
            .iter()
            .map(|r| format!("{} ({})", r.variant, category_label(r)))
            .collect();
        bail!(
            "{} of {} variant(s) failed: {}",
            failed.len(),
            summary.order.len(),
            failed.join(", ")
        );
    }

    Ok(())
}

fn print_configuration(
    variants: &[String],
    config: &BuildConfiguration,
    runtime: &ContainerRuntime,
    output: &OutputConfig,
) {
    if !output.is_text() {
        return;
    }

    let target = match &config.output {
        OutputTarget::Default => "variant directory".to_string(),
        OutputTarget::Path(path) => path.display().to_string(),
        OutputTarget::ProjectRoot => "project root".to_string(),
    };
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    output.print_info("Build configuration:");
    output.print_detail(&format!("Variants:  {}", variants.join(", ")));
    output.print_detail(&format!("Mode:      {}", config.mode));
    output.print_detail(&format!("Runtime:   {}", runtime.command()));
    output.print_detail(&format!("Rebuild:   {}", yes_no(config.force_rebuild)));
    output.print_detail(&format!("Cleanup:   {}", yes_no(config.cleanup)));
    output.print_detail(&format!("Strict:    {}", yes_no(config.strict)));
    output.print_detail(&format!("Output:    {target}"));
    println!();
}

fn print_result(result: &JobResult, output: &OutputConfig) {
    if result.success {
        output.print_success(&format!(
            "{} built in {}",
            result.variant,
            format_duration(result.elapsed)
        ));
        output.print_detail(&format!("Output: {}", result.output_path.display()));
    } else if let Some(failure) = &result.failure {
        output.print_error(&format!(
            "{} failed ({}): {failure}",
            result.variant,
            failure.category()
        ));
        if let Some(stderr) = failure.stderr() {
            for line in stderr.lines() {
                output.print_detail(&format!("| {line}"));
            }
        }
    }

    if let Some(stats) = &result.stats {
        print_stats(stats, output);
    }
    if output.is_text() {
        println!();
    }
}

fn print_summary(summary: &BuildSummary, output: &OutputConfig) {
    let total = summary.order.len();
    let succeeded = summary.succeeded_count();
    let elapsed = format_duration(summary.total);

    if summary.all_succeeded() {
        output.print_success(&format!("{succeeded}/{total} variant(s) built in {elapsed}"));
    } else {
        output.print_warning(&format!("{succeeded}/{total} variant(s) built in {elapsed}"));
    }
}

fn category_label(result: &JobResult) -> String {
    result
        .failure
        .as_ref()
        .map_or_else(|| "unknown".to_string(), |f| f.category().to_string())
}

/// JSON document describing a finished run
pub fn summary_json(summary: &BuildSummary, ctx: &JobContext) -> serde_json::Value {
    let results: Vec<serde_json::Value> = summary
        .ordered()
        .map(|r| {
            serde_json::json!({
                "variant": r.variant,
                "success": r.success,
                "category": r.failure.as_ref().map(crate::error::JobFailure::category),
                "error": r.failure.as_ref().map(ToString::to_string),
                "failure": r.failure,
                "image": r.image,
                "stats": r.stats,
                "output_path": r.output_path,
                "elapsed_secs": r.elapsed.as_secs_f64(),
            })
        })
        .collect();

    serde_json::json!({
        "status": if summary.all_succeeded() { "success" } else { "error" },
        "mode": ctx.config.mode.to_string(),
        "strict": ctx.config.strict,
        "total_secs": summary.total.as_secs_f64(),
        "succeeded": summary.succeeded_count(),
        "results": results,
    })
}
