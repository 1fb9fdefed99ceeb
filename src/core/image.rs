//! Build image cache check
//!
//! Reuses an existing image for a variant unless a rebuild is forced, and
//! builds it otherwise.

use serde::Serialize;

use crate::core::config::BuildConfiguration;
use crate::core::variant::{BuildVariant, ProjectLayout};
use crate::error::JobFailure;
use crate::infra::container::ContainerRuntime;
use crate::infra::process::{ProcessOutcome, ProcessRunner};

/// How the image for a variant became available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// An image with the variant's tag already existed
    Cached,
    /// The image was built
    Built,
}

/// Make sure the image for `variant` exists
///
/// The build descriptor is checked before the runtime is contacted. A
/// failing existence query is treated as "not cached".
pub async fn ensure_image(
    runner: &dyn ProcessRunner,
    runtime: &ContainerRuntime,
    layout: &ProjectLayout,
    variant: &BuildVariant,
    config: &BuildConfiguration,
) -> Result<ImageStatus, JobFailure> {
    let descriptor = layout.descriptor_path();
    if !descriptor.is_file() {
        return Err(JobFailure::MissingDescriptor { path: descriptor });
    }

    let tag = layout.image_tag(variant);

    if !config.force_rebuild {
        match runner.run(&runtime.image_query(&tag, config.timeouts.probe)).await {
            ProcessOutcome::Completed {
                exit_code: 0,
                stdout,
                ..
            } if !stdout.trim().is_empty() => {
                tracing::info!("Image {tag} already exists");
                return Ok(ImageStatus::Cached);
            }
            ProcessOutcome::Completed { exit_code: 0, .. } => {
                tracing::debug!("Image {tag} not found");
            }
            other => {
                tracing::debug!("Image query for {tag} failed ({other:?}), building");
            }
        }
    }

    tracing::info!("Building image {tag} for {variant}");
    let invocation = runtime
        .image_build(
            layout.root(),
            layout.descriptor(),
            &tag,
            variant.as_str(),
            config.timeouts.image_build,
        )
        .capturing(config.verbose);
    let outcome = runner.run(&invocation).await;

    match outcome.into_failure(config.stderr_limit()) {
        None => {
            tracing::info!("Built image {tag}");
            Ok(ImageStatus::Built)
        }
        Some(cause) => Err(JobFailure::ImageBuild { tag, cause }),
    }
}
