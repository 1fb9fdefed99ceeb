//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying spinners, status messages
//! and log statistics. Every function takes the [`OutputConfig`] of the
//! invocation; there is no global output state.

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::defaults::WARNINGS_SHOWN;
use crate::core::log_parser::LogStatistics;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Output settings of one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything but errors
    pub quiet: bool,
    /// Print a single JSON document instead of text
    pub json: bool,
    /// Verbosity level from `-v` flags
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Whether human-readable text is printed
    pub fn is_text(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Whether process stderr is kept for failure reports
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }

    /// Default log directive for the `-v` count
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Print a success message
    pub fn print_success(&self, message: &str) {
        if self.is_text() {
            println!("{} {message}", status::SUCCESS);
        }
    }

    /// Print an info message
    pub fn print_info(&self, message: &str) {
        if self.is_text() {
            println!("{} {message}", status::INFO);
        }
    }

    /// Print a warning
    pub fn print_warning(&self, message: &str) {
        if self.is_text() {
            println!("{} {message}", status::WARNING);
        }
    }

    /// Print an indented detail line
    pub fn print_detail(&self, message: &str) {
        if self.is_text() {
            println!("  {message}");
        }
    }

    /// Print an error line (also in quiet mode)
    pub fn print_error(&self, message: &str) {
        if !self.json {
            eprintln!("{} {message}", status::ERROR);
        }
    }

    /// Spinner for work of unknown duration, hidden unless text is printed
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if !self.is_text() {
            return ProgressBar::hidden();
        }
        create_spinner(message)
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print an error and its causes
pub fn display_error(error: &anyhow::Error, output: &OutputConfig) {
    if output.json {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let json = serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return;
    }

    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}

/// Print a statistics block for a parsed log
pub fn print_stats(stats: &LogStatistics, output: &OutputConfig) {
    if !output.is_text() {
        return;
    }
    for line in stats_lines(stats) {
        output.print_detail(&line);
    }
}

/// Summary table followed by the errors and the first diagnostics of each
/// warning-level kind
pub fn stats_lines(stats: &LogStatistics) -> Vec<String> {
    let pages = if stats.pages > 0 {
        stats.pages.to_string()
    } else {
        "unknown".to_string()
    };
    let mut lines = vec![
        format!("Pages:          {pages}"),
        format!("Errors:         {}", stats.errors.len()),
        format!("Warnings:       {}", stats.warnings.len()),
        format!("Overfull boxes: {}", stats.overfull_boxes.len()),
        format!("Underfull boxes: {}", stats.underfull_boxes.len()),
    ];
    if stats.fatal_error {
        lines.push("Fatal error:    yes".to_string());
    }

    for error in &stats.errors {
        lines.push(format!("{} l.{}: {}", status::ERROR, error.line, error.message));
    }

    let warnings = stats
        .warnings
        .iter()
        .map(|w| format!("{} {} warning: {}", status::WARNING, w.kind, w.message));
    push_limited(&mut lines, warnings, "warning(s)");

    let overfull = stats.overfull_boxes.iter().map(|b| {
        format!("{} Overfull box {:.1}pt at lines {}", status::WARNING, b.amount, b.lines)
    });
    push_limited(&mut lines, overfull, "overfull box(es)");

    let underfull = stats.underfull_boxes.iter().map(|b| {
        format!(
            "{} Underfull box (badness {:.0}) at lines {}",
            status::WARNING,
            b.amount,
            b.lines
        )
    });
    push_limited(&mut lines, underfull, "underfull box(es)");

    lines
}

/// Append at most `WARNINGS_SHOWN` entries, then a count of the rest
fn push_limited(
    lines: &mut Vec<String>,
    entries: impl ExactSizeIterator<Item = String>,
    what: &str,
) {
    let total = entries.len();
    lines.extend(entries.take(WARNINGS_SHOWN));
    if total > WARNINGS_SHOWN {
        lines.push(format!("... and {} more {what}", total - WARNINGS_SHOWN));
    }
}

/// Human-readable duration (`1.2s`, `2m 05s`)
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let whole = duration.as_secs();
        format!("{}m {:02}s", whole / 60, whole % 60)
    }
}
