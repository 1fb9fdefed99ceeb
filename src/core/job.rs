//! Single-variant build job
//!
//! Runs the stages for one variant in a fixed order, stopping at the first
//! failure:
//!
//! 1. validate the variant directory and document
//! 2. ensure the build image exists
//! 3. run the container, which writes the artifact and log into the mounted
//!    variant directory
//! 4. parse the log (also after a failed run, partial logs are kept)
//! 5. check the artifact exists and is not empty
//! 6. apply the quality gate
//! 7. remove auxiliary files if requested
//! 8. move the artifact to its output location
//!
//! Every failure is captured in the [`JobResult`]; nothing is propagated.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::clean::clean_aux_files;
use crate::core::config::{BuildConfiguration, OutputTarget};
use crate::core::image::{ensure_image, ImageStatus};
use crate::core::log_parser::{parse_log_file, LogStatistics};
use crate::core::quality;
use crate::core::variant::{BuildVariant, ProjectLayout};
use crate::error::{JobFailure, ProcessFailure};
use crate::infra::container::{ContainerRuntime, MountConfig};
use crate::infra::process::{ProcessOutcome, ProcessRunner};

/// Outcome of one variant's job
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    /// Variant built
    pub variant: BuildVariant,
    /// Whether the job succeeded
    pub success: bool,
    /// Reason for failure
    pub failure: Option<JobFailure>,
    /// Parsed log, when the container ran
    pub stats: Option<LogStatistics>,
    /// How the image became available
    pub image: Option<ImageStatus>,
    /// Time spent on this job
    pub elapsed: Duration,
    /// Artifact location (final location on success)
    pub output_path: PathBuf,
}

impl JobResult {
    /// Failed result for a job that never produced statistics
    pub fn failed(variant: BuildVariant, failure: JobFailure, output_path: PathBuf) -> Self {
        Self {
            variant,
            success: false,
            failure: Some(failure),
            stats: None,
            image: None,
            elapsed: Duration::ZERO,
            output_path,
        }
    }
}

/// Everything a job needs, shared by all workers of a run
pub struct JobContext {
    /// Process runner for runtime calls
    pub runner: Arc<dyn ProcessRunner>,
    /// Container runtime
    pub runtime: ContainerRuntime,
    /// Project file layout
    pub layout: ProjectLayout,
    /// Build settings
    pub config: BuildConfiguration,
}

impl JobContext {
    /// Create a job context
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        runtime: ContainerRuntime,
        layout: ProjectLayout,
        config: BuildConfiguration,
    ) -> Self {
        Self {
            runner,
            runtime,
            layout,
            config,
        }
    }
}

/// Stage results accumulated while a job runs
#[derive(Default)]
struct Progress {
    stats: Option<LogStatistics>,
    image: Option<ImageStatus>,
}

/// Build one variant
pub async fn run_job(ctx: &JobContext, variant: &BuildVariant) -> JobResult {
    let started = Instant::now();
    tracing::info!("Starting build for {variant}");

    let mut progress = Progress::default();
    let outcome = run_stages(ctx, variant, &mut progress).await;
    let elapsed = started.elapsed();

    match outcome {
        Ok(output_path) => {
            tracing::info!("Build for {variant} succeeded in {:.1}s", elapsed.as_secs_f64());
            JobResult {
                variant: variant.clone(),
                success: true,
                failure: None,
                stats: progress.stats,
                image: progress.image,
                elapsed,
                output_path,
            }
        }
        Err(failure) => {
            tracing::warn!("Build for {variant} failed: {failure}");
            JobResult {
                variant: variant.clone(),
                success: false,
                failure: Some(failure),
                stats: progress.stats,
                image: progress.image,
                elapsed,
                output_path: ctx.layout.artifact_path(variant),
            }
        }
    }
}

async fn run_stages(
    ctx: &JobContext,
    variant: &BuildVariant,
    progress: &mut Progress,
) -> Result<PathBuf, JobFailure> {
    validate_inputs(&ctx.layout, variant)?;

    progress.image = Some(
        ensure_image(
            ctx.runner.as_ref(),
            &ctx.runtime,
            &ctx.layout,
            variant,
            &ctx.config,
        )
        .await?,
    );

    let artifact = ctx.layout.artifact_path(variant);
    remove_stale_artifact(&artifact);

    let compile_failure = compile(ctx, variant).await;
    let stats = parse_log_file(&ctx.layout.log_path(variant));
    progress.stats = Some(stats);

    if let Some(cause) = compile_failure {
        return Err(JobFailure::Compile { cause });
    }

    validate_artifact(&artifact)?;

    if let Some(stats) = &progress.stats {
        if let Some(failure) = quality::assess(stats, ctx.config.strict) {
            return Err(JobFailure::Quality(failure));
        }
    }

    if ctx.config.cleanup {
        let dir = ctx.layout.variant_dir(variant);
        match clean_aux_files(&dir) {
            Ok(result) => tracing::info!(
                "Cleaned {} auxiliary files for {variant}",
                result.removed.len()
            ),
            Err(e) => tracing::warn!("Cleanup for {variant} incomplete: {e}"),
        }
    }

    deliver_artifact(&ctx.layout, variant, &ctx.config.output)
}

/// Check the variant directory and its primary document exist
pub fn validate_inputs(layout: &ProjectLayout, variant: &BuildVariant) -> Result<(), JobFailure> {
    let dir = layout.variant_dir(variant);
    if !dir.is_dir() {
        return Err(JobFailure::MissingSourceDir { path: dir });
    }

    let document = layout.document_path(variant);
    if !document.is_file() {
        return Err(JobFailure::MissingDocument { path: document });
    }

    Ok(())
}

/// Check the artifact exists and is not empty
pub fn validate_artifact(path: &Path) -> Result<(), JobFailure> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        Ok(meta) if meta.is_file() => Err(JobFailure::EmptyArtifact {
            path: path.to_path_buf(),
        }),
        _ => Err(JobFailure::MissingArtifact {
            path: path.to_path_buf(),
        }),
    }
}

/// An artifact left by an earlier build must not pass for a new one
fn remove_stale_artifact(path: &Path) {
    if path.is_file() {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!("Removed previous artifact {}", path.display()),
            Err(e) => tracing::warn!("Could not remove previous artifact {}: {e}", path.display()),
        }
    }
}

/// Run the container for `variant`; `None` means it exited zero
///
/// Killing the runtime client on timeout leaves the container running, so
/// it is removed by name before the failure is reported.
async fn compile(ctx: &JobContext, variant: &BuildVariant) -> Option<ProcessFailure> {
    let dir = ctx.layout.variant_dir(variant);
    let host_dir = std::fs::canonicalize(&dir).unwrap_or(dir);
    let mount = MountConfig::new(host_dir, PathBuf::from(ctx.layout.mount_point()));
    let name = ctx.layout.container_name(variant);

    let invocation = ctx
        .runtime
        .run(&ctx.layout.image_tag(variant), &name, &mount, ctx.config.timeouts.run)
        .capturing(ctx.config.verbose);

    tracing::info!("Compiling {variant}");
    let outcome = ctx.runner.run(&invocation).await;

    if matches!(outcome, ProcessOutcome::TimedOut { .. }) {
        let removal = ctx.runtime.remove(&name, ctx.config.timeouts.probe);
        if let Some(failure) = ctx.runner.run(&removal).await.into_failure(0) {
            tracing::warn!("Could not remove container {name}: {failure}");
        }
    }

    outcome.into_failure(ctx.config.stderr_limit())
}

/// Move the artifact to the configured output location
pub fn deliver_artifact(
    layout: &ProjectLayout,
    variant: &BuildVariant,
    target: &OutputTarget,
) -> Result<PathBuf, JobFailure> {
    let source = layout.artifact_path(variant);
    let destination = match target {
        OutputTarget::Default => return Ok(source),
        OutputTarget::Path(path) => layout.root().join(path),
        OutputTarget::ProjectRoot => layout.root_artifact_path(variant),
    };
    if destination == source {
        return Ok(source);
    }

    let delivery_error = |e: std::io::Error| JobFailure::Delivery {
        path: destination.clone(),
        error: e.to_string(),
    };

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(delivery_error)?;
    }
    if std::fs::rename(&source, &destination).is_err() {
        // rename fails across filesystems
        std::fs::copy(&source, &destination).map_err(delivery_error)?;
        std::fs::remove_file(&source).map_err(delivery_error)?;
    }

    tracing::info!("Artifact moved to {}", destination.display());
    Ok(destination)
}
