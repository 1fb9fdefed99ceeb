//! texdock - containerized LaTeX document builder
//!
//! Builds language variants of a LaTeX document inside a container image,
//! parses the compiler log into structured statistics and applies a quality
//! gate to the result.
//!
//! # Layout
//!
//! - [`cli`]: flags, subcommands and terminal/JSON rendering
//! - [`core`]: variants, jobs, log parsing, the quality gate and orchestration
//! - [`infra`]: external processes and the container runtime command line
//! - [`config`]: `texdock.toml` and built-in defaults
//! - [`error`]: per-run and per-variant error types

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
