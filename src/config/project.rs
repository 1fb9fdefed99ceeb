//! Project configuration management
//!
//! Reads optional project settings from `texdock.toml` in the project root.
//! Settings cover the variant layout, the container runtime and the
//! per-stage timeouts. Every section is optional and falls back to
//! [`crate::config::defaults`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::defaults;
use crate::error::ProjectConfigError;

/// Project configuration for texdock
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Document layout settings
    #[serde(default)]
    pub project: LayoutConfig,

    /// Container runtime settings
    #[serde(default)]
    pub container: ContainerConfig,

    /// Per-stage timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Document layout settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Variants that may be requested
    pub variants: Option<Vec<String>>,

    /// Primary document inside each variant directory
    pub document: Option<String>,

    /// Artifact produced by the toolchain
    pub artifact: Option<String>,

    /// Log produced by the toolchain
    pub log: Option<String>,

    /// Prefix of the variant directories
    pub variant_dir_prefix: Option<String>,
}

/// Container runtime settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Runtime command (`docker`, `podman` or a path)
    pub runtime: Option<String>,

    /// Image tag prefix
    pub image_prefix: Option<String>,

    /// Build descriptor relative to the project root
    pub descriptor: Option<String>,

    /// Mount point of the variant directory inside the container
    pub mount_point: Option<String>,
}

/// Per-stage timeouts in seconds
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Runtime probe timeout
    pub probe_secs: Option<u64>,

    /// Image build timeout
    pub image_build_secs: Option<u64>,

    /// Container run timeout
    pub run_secs: Option<u64>,
}

impl ProjectConfig {
    /// Load the project configuration from a project root
    ///
    /// If `texdock.toml` doesn't exist, returns the default configuration.
    pub fn load(project_dir: &Path) -> Result<Self, ProjectConfigError> {
        Self::load_from_path(&project_dir.join(defaults::PROJECT_CONFIG_FILE))
    }

    /// Load the project configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ProjectConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ProjectConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ProjectConfigError::ParseError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Variants that may be requested
    pub fn variants(&self) -> Vec<String> {
        self.project.variants.clone().unwrap_or_else(|| {
            defaults::DEFAULT_VARIANTS
                .iter()
                .map(|v| (*v).to_string())
                .collect()
        })
    }

    /// Primary document file name
    pub fn document(&self) -> &str {
        self.project
            .document
            .as_deref()
            .unwrap_or(defaults::DEFAULT_DOCUMENT)
    }

    /// Artifact file name
    pub fn artifact(&self) -> &str {
        self.project
            .artifact
            .as_deref()
            .unwrap_or(defaults::DEFAULT_ARTIFACT)
    }

    /// Log file name
    pub fn log(&self) -> &str {
        self.project.log.as_deref().unwrap_or(defaults::DEFAULT_LOG)
    }

    /// Variant directory prefix
    pub fn variant_dir_prefix(&self) -> &str {
        self.project
            .variant_dir_prefix
            .as_deref()
            .unwrap_or(defaults::DEFAULT_VARIANT_DIR_PREFIX)
    }

    /// Runtime command
    pub fn runtime(&self) -> &str {
        self.container
            .runtime
            .as_deref()
            .unwrap_or(defaults::DEFAULT_RUNTIME)
    }

    /// Image tag prefix
    pub fn image_prefix(&self) -> &str {
        self.container
            .image_prefix
            .as_deref()
            .unwrap_or(defaults::DEFAULT_IMAGE_PREFIX)
    }

    /// Build descriptor file name
    pub fn descriptor(&self) -> &str {
        self.container
            .descriptor
            .as_deref()
            .unwrap_or(defaults::DEFAULT_DESCRIPTOR)
    }

    /// Container mount point
    pub fn mount_point(&self) -> &str {
        self.container
            .mount_point
            .as_deref()
            .unwrap_or(defaults::DEFAULT_MOUNT_POINT)
    }

    /// Probe timeout
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(
            self.timeouts
                .probe_secs
                .unwrap_or(defaults::PROBE_TIMEOUT_SECS),
        )
    }

    /// Image build timeout
    pub fn image_build_timeout(&self) -> Duration {
        Duration::from_secs(
            self.timeouts
                .image_build_secs
                .unwrap_or(defaults::IMAGE_BUILD_TIMEOUT_SECS),
        )
    }

    /// Container run timeout
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.run_secs.unwrap_or(defaults::RUN_TIMEOUT_SECS))
    }
}
