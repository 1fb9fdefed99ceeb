//! Quality gate over parsed log statistics
//!
//! Errors and fatal markers always fail a build. Warnings, overfull boxes
//! and underfull boxes are counted together and only fail a build in strict
//! mode.

use serde::Serialize;

use crate::core::log_parser::LogStatistics;

/// Why the gate rejected a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "count", rename_all = "snake_case")]
pub enum QualityFailure {
    /// The engine reported a fatal error
    Fatal,
    /// The log contains errors
    Errors(usize),
    /// Strict mode and the log contains warning-level diagnostics
    Warnings(usize),
}

impl std::fmt::Display for QualityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal => write!(f, "fatal error in log"),
            Self::Errors(n) => write!(f, "{n} error(s) in log"),
            Self::Warnings(n) => write!(f, "{n} warning(s) in strict mode"),
        }
    }
}

/// Gate decision together with the statistics it was taken on
#[derive(Debug, Clone, PartialEq)]
pub struct QualityVerdict {
    /// Whether the log is acceptable
    pub passed: bool,
    /// Reason for rejection
    pub failure: Option<QualityFailure>,
    /// Statistics the decision was taken on, unchanged
    pub stats: LogStatistics,
}

/// Decide whether `stats` is acceptable
pub fn evaluate(stats: LogStatistics, strict: bool) -> QualityVerdict {
    let failure = assess(&stats, strict);
    QualityVerdict {
        passed: failure.is_none(),
        failure,
        stats,
    }
}

/// Reason `stats` fails the gate, if it does
pub fn assess(stats: &LogStatistics, strict: bool) -> Option<QualityFailure> {
    if stats.fatal_error {
        return Some(QualityFailure::Fatal);
    }
    if !stats.errors.is_empty() {
        return Some(QualityFailure::Errors(stats.errors.len()));
    }

    let total_warnings = stats.total_warnings();
    if strict && total_warnings > 0 {
        return Some(QualityFailure::Warnings(total_warnings));
    }

    None
}
