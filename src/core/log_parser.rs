//! LaTeX log analysis
//!
//! Turns the plaintext log written by the TeX toolchain into
//! [`LogStatistics`]. Each diagnostic class has its own independent matcher
//! (a pure function from text to records), so every class can be tested in
//! isolation against literal log fixtures.
//!
//! Parsing never fails: a missing log yields empty statistics, invalid UTF-8
//! is replaced, and a field that cannot be extracted falls back to a default
//! instead of dropping the record.

use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

/// Characters searched on each side of an error for its `l.<N>` reference
pub const LINE_SEARCH_WINDOW: usize = 500;

/// Maximum length of an error's context snippet, in characters
pub const CONTEXT_LIMIT: usize = 200;

/// Line value used when no line reference is available
pub const UNKNOWN_LINE: &str = "unknown";

/// Markers that mean the engine gave up
const FATAL_MARKERS: &[&str] = &["Fatal error occurred", "Emergency stop"];

/// An error reported by the toolchain (`! ...` line)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatexError {
    /// Error message without the `!` sigil
    pub message: String,
    /// Source line number, or `"unknown"`
    pub line: String,
    /// Log excerpt starting at the error
    pub context: String,
}

/// A warning reported by LaTeX, a package, a class or the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatexWarning {
    /// Category label (`LaTeX`, `LaTeX Font`, `Package hyperref`, ...)
    pub kind: String,
    /// Warning text
    pub message: String,
    /// Always `"unknown"`: warnings carry no reliable line number
    pub line: String,
}

/// An overfull or underfull `\hbox` diagnostic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxDiagnostic {
    /// Overflow in points (overfull) or badness (underfull)
    pub amount: f64,
    /// Where the box was built (`in paragraph`, `in alignment`, ...)
    pub location: String,
    /// Line or line range token (`10--12`), or `"unknown"`
    pub lines: String,
}

/// Structured quality information extracted from one log
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogStatistics {
    /// Errors in order of appearance
    pub errors: Vec<LatexError>,
    /// Warnings in order of appearance
    pub warnings: Vec<LatexWarning>,
    /// Overfull boxes in order of appearance
    pub overfull_boxes: Vec<BoxDiagnostic>,
    /// Underfull boxes in order of appearance
    pub underfull_boxes: Vec<BoxDiagnostic>,
    /// Page count from the final output marker, 0 when absent
    pub pages: u32,
    /// File named by the final output marker
    pub output_file: Option<String>,
    /// Whether the engine reported a fatal error
    pub fatal_error: bool,
}

impl LogStatistics {
    /// Warnings, overfull and underfull boxes counted together
    pub fn total_warnings(&self) -> usize {
        self.warnings.len() + self.overfull_boxes.len() + self.underfull_boxes.len()
    }

    /// Whether the log contains no diagnostics at all
    pub fn is_clean(&self) -> bool {
        !self.fatal_error && self.errors.is_empty() && self.total_warnings() == 0
    }
}

struct Patterns {
    error: Regex,
    line_ref: Regex,
    warning: Regex,
    overfull: Regex,
    underfull: Regex,
    box_lines: Regex,
    number: Regex,
    output: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        error: compile(r"(?m)^! *(\S.*)$"),
        line_ref: compile(r"(?m)^l\.(\d+)"),
        warning: compile(
            r"(?m)^(LaTeX Font|LaTeX|Package \S+|Class \S+|pdfTeX) [Ww]arning(?: \([^)\n]*\))?:? *(.*)$",
        ),
        overfull: compile(r"(?m)^Overfull \\hbox \(([^)\n]*)\)(.*)$"),
        underfull: compile(r"(?m)^Underfull \\hbox \(([^)\n]*)\)(.*)$"),
        box_lines: compile(r"(?:detected at line|at lines?)\s+(\d+(?:--\d+)?)"),
        number: compile(r"\d*\.?\d+"),
        output: compile(r"Output written on (.+?) \((\d+) pages?"),
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid built-in log pattern")
}

/// Parse the log file at `path`
///
/// A missing file yields empty statistics. Any other read failure is logged
/// as a warning and also yields empty statistics.
pub fn parse_log_file(path: &Path) -> LogStatistics {
    match std::fs::read(path) {
        Ok(bytes) => parse_log_bytes(&bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No log at {}", path.display());
            LogStatistics::default()
        }
        Err(e) => {
            tracing::warn!("Could not read log {}: {e}", path.display());
            LogStatistics::default()
        }
    }
}

/// Parse raw log bytes, replacing invalid UTF-8
pub fn parse_log_bytes(bytes: &[u8]) -> LogStatistics {
    parse_log(&String::from_utf8_lossy(bytes))
}

/// Parse log text
pub fn parse_log(text: &str) -> LogStatistics {
    let (pages, output_file) = match scan_output(text) {
        Some((pages, file)) => (pages, Some(file)),
        None => (0, None),
    };

    LogStatistics {
        errors: scan_errors(text),
        warnings: scan_warnings(text),
        overfull_boxes: scan_overfull_boxes(text),
        underfull_boxes: scan_underfull_boxes(text),
        pages,
        output_file,
        fatal_error: detect_fatal(text),
    }
}

/// Whether the text contains a fatal-error marker
pub fn detect_fatal(text: &str) -> bool {
    FATAL_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Collect `! ...` errors with their line reference and context
pub fn scan_errors(text: &str) -> Vec<LatexError> {
    let p = patterns();
    let spans: Vec<(usize, usize, &str)> = p
        .error
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let message = caps.get(1)?.as_str();
            Some((whole.start(), whole.end(), message))
        })
        .collect();

    spans
        .iter()
        .enumerate()
        .map(|(i, &(start, end, message))| {
            // The window never crosses into a neighbouring error.
            let forward_limit = spans.get(i + 1).map_or(text.len(), |next| next.0);
            let backward_limit = if i == 0 { 0 } else { spans[i - 1].1 };

            let forward_end = chars_after(text, end, LINE_SEARCH_WINDOW).min(forward_limit);
            let backward_start = chars_before(text, start, LINE_SEARCH_WINDOW).max(backward_limit);

            let line = first_line_ref(&text[end..forward_end])
                .or_else(|| last_line_ref(&text[backward_start..start]))
                .unwrap_or_else(|| UNKNOWN_LINE.to_string());

            let context_end = chars_after(text, start, CONTEXT_LIMIT);

            LatexError {
                message: message.trim().to_string(),
                line,
                context: text[start..context_end].trim_end().to_string(),
            }
        })
        .collect()
}

fn first_line_ref(window: &str) -> Option<String> {
    patterns()
        .line_ref
        .captures(window)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn last_line_ref(window: &str) -> Option<String> {
    patterns()
        .line_ref
        .captures_iter(window)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Collect warnings of the recognized categories
pub fn scan_warnings(text: &str) -> Vec<LatexWarning> {
    patterns()
        .warning
        .captures_iter(text)
        .map(|caps| LatexWarning {
            kind: caps.get(1).map_or("", |m| m.as_str()).to_string(),
            message: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            line: UNKNOWN_LINE.to_string(),
        })
        .collect()
}

/// Collect `Overfull \hbox (<n>pt too wide)` diagnostics
pub fn scan_overfull_boxes(text: &str) -> Vec<BoxDiagnostic> {
    scan_boxes(&patterns().overfull, text)
}

/// Collect `Underfull \hbox (badness <n>)` diagnostics
pub fn scan_underfull_boxes(text: &str) -> Vec<BoxDiagnostic> {
    scan_boxes(&patterns().underfull, text)
}

fn scan_boxes(pattern: &Regex, text: &str) -> Vec<BoxDiagnostic> {
    let p = patterns();
    pattern
        .captures_iter(text)
        .map(|caps| {
            let measure = caps.get(1).map_or("", |m| m.as_str());
            let rest = caps.get(2).map_or("", |m| m.as_str());

            let amount = p
                .number
                .find(measure)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);

            let (location, lines) = match p.box_lines.captures(rest) {
                Some(lines) => {
                    let token = lines.get(0).map_or(rest.len(), |m| m.start());
                    (
                        rest[..token].trim().to_string(),
                        lines.get(1).map_or(UNKNOWN_LINE, |m| m.as_str()).to_string(),
                    )
                }
                None => (rest.trim().to_string(), UNKNOWN_LINE.to_string()),
            };

            BoxDiagnostic {
                amount,
                location,
                lines,
            }
        })
        .collect()
}

/// Page count and file name from the last `Output written on` marker
pub fn scan_output(text: &str) -> Option<(u32, String)> {
    patterns().output.captures_iter(text).last().map(|caps| {
        let file = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let pages = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        (pages, file)
    })
}

/// Byte index `count` characters after `from`, or the end of `text`
fn chars_after(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map_or(text.len(), |(offset, _)| from + offset)
}

/// Byte index `count` characters before `from`, or the start of `text`
fn chars_before(text: &str, from: usize, count: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map_or(from, |(index, _)| index)
}
