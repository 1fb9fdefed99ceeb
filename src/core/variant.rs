//! Build variants and the on-disk project layout
//!
//! A variant (usually a language code) selects the source directory, the
//! image tag and the artifact location of one build job.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::project::ProjectConfig;
use crate::error::BuildError;

/// Identifier of one document edition (e.g. `en`, `fr`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BuildVariant(String);

impl BuildVariant {
    /// Create a variant
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Variant name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check requested variant names against the allowed list
///
/// Keeps the requested order. Rejects an empty request, unknown names and
/// duplicates.
pub fn validate_variants(
    requested: &[String],
    allowed: &[String],
) -> Result<Vec<BuildVariant>, BuildError> {
    if requested.is_empty() {
        return Err(BuildError::NoVariants);
    }

    let mut variants: Vec<BuildVariant> = Vec::with_capacity(requested.len());
    for name in requested {
        if !allowed.contains(name) {
            return Err(BuildError::InvalidVariant {
                variant: name.clone(),
                allowed: allowed.to_vec(),
            });
        }
        let variant = BuildVariant::new(name.as_str());
        if variants.contains(&variant) {
            return Err(BuildError::DuplicateVariant {
                variant: name.clone(),
            });
        }
        variants.push(variant);
    }

    Ok(variants)
}

/// File locations of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    dir_prefix: String,
    document: String,
    artifact: String,
    log: String,
    descriptor: String,
    image_prefix: String,
    mount_point: String,
}

impl ProjectLayout {
    /// Layout for the project at `root` as described by `config`
    pub fn new(root: &Path, config: &ProjectConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            dir_prefix: config.variant_dir_prefix().to_string(),
            document: config.document().to_string(),
            artifact: config.artifact().to_string(),
            log: config.log().to_string(),
            descriptor: config.descriptor().to_string(),
            image_prefix: config.image_prefix().to_string(),
            mount_point: config.mount_point().to_string(),
        }
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source directory of a variant (`<root>/cv-<variant>`)
    pub fn variant_dir(&self, variant: &BuildVariant) -> PathBuf {
        self.root.join(format!("{}{variant}", self.dir_prefix))
    }

    /// Primary document of a variant
    pub fn document_path(&self, variant: &BuildVariant) -> PathBuf {
        self.variant_dir(variant).join(&self.document)
    }

    /// Artifact written by the toolchain
    pub fn artifact_path(&self, variant: &BuildVariant) -> PathBuf {
        self.variant_dir(variant).join(&self.artifact)
    }

    /// Log written by the toolchain
    pub fn log_path(&self, variant: &BuildVariant) -> PathBuf {
        self.variant_dir(variant).join(&self.log)
    }

    /// Artifact location in the project root (`<root>/cv-<variant>.pdf`)
    pub fn root_artifact_path(&self, variant: &BuildVariant) -> PathBuf {
        let extension = Path::new(&self.artifact)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("pdf");
        self.root
            .join(format!("{}{variant}.{extension}", self.dir_prefix))
    }

    /// Image build descriptor file name, relative to the root
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Image build descriptor path
    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(&self.descriptor)
    }

    /// Image tag of a variant (`cv-builder-<variant>`)
    pub fn image_tag(&self, variant: &BuildVariant) -> String {
        format!("{}-{variant}", self.image_prefix)
    }

    /// Container name for this process's compile of `variant`
    pub fn container_name(&self, variant: &BuildVariant) -> String {
        format!("{}-{}", self.image_tag(variant), std::process::id())
    }

    /// Mount point of the variant directory inside the container
    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }
}
