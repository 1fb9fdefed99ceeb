//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in for `docker` answering the verbs texdock uses
///
/// `run` writes the artifact and log into the mounted directory. A `fail`
/// marker file in the variant directory makes the compile fail, a `warn`
/// marker makes the log carry a warning.
pub const FAKE_RUNTIME: &str = r#"#!/bin/sh
case "$1" in
  --version) echo "Docker version 24.0.7, build fake"; exit 0 ;;
  info) echo "Server:"; exit 0 ;;
  images) echo "abc123"; exit 0 ;;
  build) exit 0 ;;
  run)
    host="${4%:*}"
    if [ -f "$host/fail" ]; then
      printf '! Undefined control sequence.\nl.42 \\foo\n! Emergency stop.\n' > "$host/resume.log"
      echo "latexmk: errors in resume.tex" >&2
      exit 12
    fi
    printf '%%PDF-1.5\n' > "$host/resume.pdf"
    if [ -f "$host/warn" ]; then
      printf 'LaTeX Warning: There were undefined references.\nOutput written on resume.pdf (1 page, 10 bytes).\n' > "$host/resume.log"
    else
      printf 'Output written on resume.pdf (2 pages, 50000 bytes).\n' > "$host/resume.log"
    fi
    echo "aux" > "$host/resume.aux"
    exit 0 ;;
esac
exit 1
"#;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Project with a build descriptor and the given variants
    pub fn with_variants(variants: &[&str]) -> Self {
        let project = Self::new();
        project.create_file("Dockerfile.cv", "FROM texlive/texlive\n");
        for variant in variants {
            project.create_file(
                &format!("cv-{variant}/resume.tex"),
                "\\documentclass{article}\n\\begin{document}CV\\end{document}\n",
            );
        }
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Install the fake runtime script and return its path
    #[cfg(unix)]
    pub fn install_fake_runtime(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join("fake-docker");
        std::fs::write(&path, FAKE_RUNTIME).expect("Failed to write fake runtime");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake runtime executable");
        path
    }

    /// Run texdock in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        texdock(self.dir.path(), args)
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the texdock binary in `dir`
pub fn texdock(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_texdock"))
        .current_dir(dir)
        .env_remove("TEXDOCK_RUNTIME")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute texdock")
}

/// First JSON document printed on stdout
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::Deserializer::from_str(&stdout)
        .into_iter::<serde_json::Value>()
        .next()
        .expect("no JSON on stdout")
        .expect("invalid JSON on stdout")
}

/// Log with one error and a fatal stop
pub const ERROR_LOG: &str = "This is pdfTeX, Version 3.141592653\n\
! Undefined control sequence.\n\
l.42 \\foo\n\
! Emergency stop.\n";

/// Log with warnings and boxes but no errors
pub const WARNING_LOG: &str = "LaTeX Warning: Reference `sec:intro' on page 1 undefined on input line 12.\n\
Package hyperref Warning: Token not allowed in a PDF string.\n\
Overfull \\hbox (15.2pt too wide) in paragraph at lines 10--12\n\
Underfull \\hbox (badness 10000) in paragraph at lines 20--21\n\
Output written on resume.pdf (2 pages, 50000 bytes).\n";
