//! Infrastructure layer
//!
//! Handles external processes and the container runtime command line.

pub mod container;
pub mod process;
