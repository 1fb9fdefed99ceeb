//! Test utilities
//!
//! A scripted [`ProcessRunner`] standing in for the container runtime, and
//! proptest generators for log text.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::infra::process::{Invocation, ProcessOutcome, ProcessRunner};

type Matcher = Box<dyn Fn(&Invocation) -> bool + Send + Sync>;
type Effect = Box<dyn Fn(&Invocation) + Send + Sync>;

struct Rule {
    matches: Matcher,
    outcome: ProcessOutcome,
    effect: Option<Effect>,
}

/// [`ProcessRunner`] answering from a list of rules
///
/// The first matching rule wins. Unmatched invocations complete with exit
/// code 0 and no output. Every invocation is recorded.
#[derive(Default, Clone)]
pub struct ScriptedRunner {
    rules: Arc<Mutex<Vec<Rule>>>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer invocations whose first argument is `verb`
    #[must_use]
    pub fn on(self, verb: &str, outcome: ProcessOutcome) -> Self {
        let verb = verb.to_string();
        self.rule(
            Box::new(move |inv| inv.args.first() == Some(&verb)),
            outcome,
            None,
        )
    }

    /// Answer invocations whose first argument is `verb` and whose arguments
    /// contain `needle`
    #[must_use]
    pub fn on_with_arg(self, verb: &str, needle: &str, outcome: ProcessOutcome) -> Self {
        let verb = verb.to_string();
        let needle = needle.to_string();
        self.rule(
            Box::new(move |inv| {
                inv.args.first() == Some(&verb) && inv.args.iter().any(|a| a.contains(&needle))
            }),
            outcome,
            None,
        )
    }

    /// Answer `run` invocations and apply `effect` first (e.g. write the
    /// artifact into the mounted directory)
    #[must_use]
    pub fn on_run(
        self,
        outcome: ProcessOutcome,
        effect: impl Fn(&Invocation) + Send + Sync + 'static,
    ) -> Self {
        self.rule(
            Box::new(|inv| inv.args.first().map(String::as_str) == Some("run")),
            outcome,
            Some(Box::new(effect)),
        )
    }

    fn rule(self, matches: Matcher, outcome: ProcessOutcome, effect: Option<Effect>) -> Self {
        self.rules
            .lock()
            .expect("rules lock poisoned")
            .push(Rule {
                matches,
                outcome,
                effect,
            });
        self
    }

    /// Successful completion with `stdout`
    pub fn ok(stdout: &str) -> ProcessOutcome {
        ProcessOutcome::Completed {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// Completion with `exit_code` and `stdout`
    pub fn exit(exit_code: i32, stdout: &str) -> ProcessOutcome {
        ProcessOutcome::Completed {
            exit_code,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// Timeout outcome
    pub fn timed_out() -> ProcessOutcome {
        ProcessOutcome::TimedOut {
            after: Duration::from_secs(1),
        }
    }

    /// Recorded invocations
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Recorded invocations whose first argument is `verb`
    pub fn calls_to(&self, verb: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.args.first().map(String::as_str) == Some(verb))
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> ProcessOutcome {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(invocation.clone());

        let rules = self.rules.lock().expect("rules lock poisoned");
        match rules.iter().find(|rule| (rule.matches)(invocation)) {
            Some(rule) => {
                if let Some(effect) = &rule.effect {
                    effect(invocation);
                }
                rule.outcome.clone()
            }
            None => Self::ok(""),
        }
    }
}

/// Host directory of the `-v host:container` mount of a `run` invocation
pub fn mounted_dir(invocation: &Invocation) -> PathBuf {
    let spec = invocation
        .args
        .iter()
        .skip_while(|a| a.as_str() != "-v")
        .nth(1)
        .expect("run invocation without -v");
    let host = spec.rsplit_once(':').map_or(spec.as_str(), |(host, _)| host);
    PathBuf::from(host)
}

/// Create a variant directory with its document under `root`
pub fn create_variant(root: &std::path::Path, variant: &str) -> PathBuf {
    let dir = root.join(format!("cv-{variant}"));
    std::fs::create_dir_all(&dir).expect("Failed to create variant directory");
    std::fs::write(dir.join("resume.tex"), "\\documentclass{article}").expect("Failed to write document");
    dir
}

/// Create the image build descriptor under `root`
pub fn create_descriptor(root: &std::path::Path) {
    std::fs::write(root.join("Dockerfile.cv"), "FROM texlive/texlive\n")
        .expect("Failed to write descriptor");
}

pub mod generators {
    use proptest::prelude::*;

    /// Generate a single LaTeX-log-like line, marker or noise
    pub fn log_line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9 .,()]{0,60}",
            "[a-zA-Z ]{1,30}".prop_map(|m| format!("! {m}.")),
            (1u32..2000).prop_map(|n| format!("l.{n} \\foo")),
            "[a-zA-Z ]{1,30}".prop_map(|m| format!("LaTeX Warning: {m}")),
            (
                "[a-z]{2,10}",
                "[a-zA-Z ]{1,30}"
            )
                .prop_map(|(p, m)| format!("Package {p} Warning: {m}")),
            (0u32..100, 0u32..10, 1u32..500).prop_map(|(a, b, l)| format!(
                "Overfull \\hbox ({a}.{b}pt too wide) in paragraph at lines {l}--{}",
                l + 2
            )),
            (1000u32..10001, 1u32..500).prop_map(|(b, l)| format!(
                "Underfull \\hbox (badness {b}) in paragraph at lines {l}--{}",
                l + 1
            )),
            (1u32..50).prop_map(|n| format!("Output written on resume.pdf ({n} pages, 1234 bytes).")),
            Just("! Emergency stop.".to_string()),
        ]
    }

    /// Generate a whole log made of [`log_line`]s
    pub fn log_text() -> impl Strategy<Value = String> {
        prop::collection::vec(log_line(), 0..40).prop_map(|lines| lines.join("\n"))
    }
}
