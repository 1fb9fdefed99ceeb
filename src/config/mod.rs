//! Configuration constants and the project configuration file
//!
//! - [`defaults`] - Default values used when `texdock.toml` is silent
//! - [`project`] - `texdock.toml` parsing

pub mod defaults;
pub mod project;
