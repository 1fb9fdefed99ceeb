//! Core business logic module
//!
//! This module contains the build logic for texdock. External processes are
//! reached only through [`crate::infra::process::ProcessRunner`].
//!
//! # Submodules
//!
//! - [`variant`] - Build variants and the project file layout
//! - [`config`] - Per-invocation build configuration
//! - [`log_parser`] - LaTeX log parsing into structured statistics
//! - [`quality`] - Quality gate over parsed statistics
//! - [`image`] - Build image cache check
//! - [`job`] - Single-variant build job
//! - [`orchestrator`] - Sequential and parallel orchestration
//! - [`clean`] - Auxiliary file cleanup
//! - [`doctor`] - Environment checks

pub mod clean;
pub mod config;
pub mod doctor;
pub mod image;
pub mod job;
pub mod log_parser;
pub mod orchestrator;
pub mod quality;
pub mod variant;
