//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod analyze;
pub mod build;
pub mod clean;
pub mod doctor;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::cli::output::OutputConfig;
use crate::config::defaults::DEFAULT_VARIANT;
use crate::config::project::ProjectConfig;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build document variants in containers
    Build {
        /// Variant to build (repeatable, default: en)
        #[arg(short = 'l', long = "lang", value_name = "VARIANT")]
        variants: Vec<String>,

        /// Build every configured variant
        #[arg(long, conflicts_with = "variants")]
        all: bool,

        /// Build variants concurrently
        #[arg(short, long)]
        parallel: bool,

        /// Move the artifact to this path (single variant only)
        #[arg(short, long, value_name = "PATH", conflicts_with = "move_to_root")]
        output: Option<PathBuf>,

        /// Move artifacts to <root>/cv-<variant>.pdf
        #[arg(long)]
        move_to_root: bool,

        /// Rebuild images even if they exist
        #[arg(long)]
        rebuild: bool,

        /// Remove auxiliary files after a successful build
        #[arg(long)]
        clean: bool,

        /// Fail on warnings and bad boxes
        #[arg(long)]
        strict: bool,

        /// Container runtime command
        #[arg(long, env = "TEXDOCK_RUNTIME", value_name = "CMD")]
        runtime: Option<String>,

        /// Compile timeout in seconds
        #[arg(long, value_name = "SECS")]
        run_timeout: Option<u64>,

        /// Image build timeout in seconds
        #[arg(long, value_name = "SECS")]
        build_timeout: Option<u64>,
    },

    /// Parse an existing LaTeX log and apply the quality gate
    Analyze {
        /// Log file to analyze
        log: PathBuf,

        /// Fail on warnings and bad boxes
        #[arg(long)]
        strict: bool,
    },

    /// Remove auxiliary LaTeX files from variant directories
    Clean {
        /// Variant to clean (repeatable, default: en)
        #[arg(short = 'l', long = "lang", value_name = "VARIANT")]
        variants: Vec<String>,

        /// Clean every configured variant
        #[arg(long, conflicts_with = "variants")]
        all: bool,
    },

    /// Check the container runtime and the project layout
    Doctor {
        /// Container runtime command
        #[arg(long, env = "TEXDOCK_RUNTIME", value_name = "CMD")]
        runtime: Option<String>,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, output: &OutputConfig) -> Result<()> {
        match self {
            Self::Build {
                variants,
                all,
                parallel,
                output: output_path,
                move_to_root,
                rebuild,
                clean,
                strict,
                runtime,
                run_timeout,
                build_timeout,
            } => {
                let current_dir = std::env::current_dir()?;
                let options = build::BuildOptions {
                    variants,
                    all,
                    parallel,
                    output: output_path,
                    move_to_root,
                    rebuild,
                    clean,
                    strict,
                    runtime,
                    run_timeout,
                    build_timeout,
                };
                build::execute(&current_dir, options, output).await
            }
            Self::Analyze { log, strict } => analyze::execute(&log, strict, output).await,
            Self::Clean { variants, all } => {
                let current_dir = std::env::current_dir()?;
                clean::execute(&current_dir, variants, all, output).await
            }
            Self::Doctor { runtime } => {
                let current_dir = std::env::current_dir()?;
                doctor::execute(&current_dir, runtime.as_deref(), output).await
            }
        }
    }
}

/// Variant names for a command: all configured ones, the requested ones, or
/// the default variant
pub fn requested_variants(variants: Vec<String>, all: bool, config: &ProjectConfig) -> Vec<String> {
    if all {
        config.variants()
    } else if variants.is_empty() {
        vec![DEFAULT_VARIANT.to_string()]
    } else {
        variants
    }
}
