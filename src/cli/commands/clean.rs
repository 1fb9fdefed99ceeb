//! CLI implementation for `texdock clean` command
//!
//! Removes auxiliary LaTeX files from the requested variant directories.

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::commands::requested_variants;
use crate::cli::output::OutputConfig;
use crate::config::project::ProjectConfig;
use crate::core::clean::clean_aux_files;
use crate::core::variant::{validate_variants, ProjectLayout};

/// Execute the clean command
pub async fn execute(
    project_dir: &Path,
    variants: Vec<String>,
    all: bool,
    output: &OutputConfig,
) -> Result<()> {
    let project = ProjectConfig::load(project_dir).context("Failed to load project configuration")?;
    let requested = requested_variants(variants, all, &project);
    let variants = validate_variants(&requested, &project.variants())?;
    let layout = ProjectLayout::new(project_dir, &project);

    let mut cleaned = Vec::new();
    for variant in &variants {
        let dir = layout.variant_dir(variant);
        let result = clean_aux_files(&dir)
            .with_context(|| format!("Failed to clean {}", dir.display()))?;
        cleaned.push((variant, result));
    }

    if output.json {
        let json_result = serde_json::json!({
            "status": "success",
            "variants": cleaned.iter().map(|(variant, result)| serde_json::json!({
                "variant": variant,
                "removed": result.removed,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&json_result)?);
        return Ok(());
    }

    for (variant, result) in &cleaned {
        if result.removed.is_empty() {
            output.print_success(&format!("{variant}: nothing to clean"));
        } else {
            output.print_success(&format!(
                "{variant}: removed {} auxiliary file(s)",
                result.removed.len()
            ));
            for path in &result.removed {
                if let Some(name) = path.file_name() {
                    output.print_detail(&format!("Removed {}", name.to_string_lossy()));
                }
            }
        }
    }

    Ok(())
}
