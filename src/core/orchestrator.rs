//! Build orchestration logic
//!
//! Runs the pre-flight checks once, then one job per variant, either one
//! after the other or concurrently, and gathers the results into a
//! [`BuildSummary`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use crate::core::config::{ExecutionMode, OutputTarget};
use crate::core::job::{run_job, JobContext, JobResult};
use crate::core::variant::{validate_variants, BuildVariant};
use crate::error::{BuildError, JobFailure};

/// Results of a whole run
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// One result per requested variant
    pub results: BTreeMap<BuildVariant, JobResult>,
    /// Requested order
    pub order: Vec<BuildVariant>,
    /// Wall-clock time of the run
    pub total: Duration,
}

impl BuildSummary {
    /// Whether every variant succeeded
    pub fn all_succeeded(&self) -> bool {
        self.results.values().all(|r| r.success)
    }

    /// Results in requested order
    pub fn ordered(&self) -> impl Iterator<Item = &JobResult> {
        self.order.iter().filter_map(|v| self.results.get(v))
    }

    /// Failed results in requested order
    pub fn failed(&self) -> Vec<&JobResult> {
        self.ordered().filter(|r| !r.success).collect()
    }

    /// Number of successful variants
    pub fn succeeded_count(&self) -> usize {
        self.results.values().filter(|r| r.success).count()
    }
}

/// Build orchestrator
pub struct BuildOrchestrator {
    ctx: Arc<JobContext>,
    allowed: Vec<String>,
}

impl BuildOrchestrator {
    /// Create an orchestrator accepting the variants in `allowed`
    pub fn new(ctx: JobContext, allowed: Vec<String>) -> Self {
        Self {
            ctx: Arc::new(ctx),
            allowed,
        }
    }

    /// Shared job context
    pub fn context(&self) -> &JobContext {
        &self.ctx
    }

    /// Checks that must pass before any job starts
    pub async fn preflight(&self, requested: &[String]) -> Result<Vec<BuildVariant>, BuildError> {
        let variants = validate_variants(requested, &self.allowed)?;

        if matches!(self.ctx.config.output, OutputTarget::Path(_)) && variants.len() > 1 {
            return Err(BuildError::OutputOverrideConflict {
                count: variants.len(),
            });
        }

        self.ctx
            .runtime
            .ensure_available(self.ctx.runner.as_ref(), self.ctx.config.timeouts.probe)
            .await?;

        Ok(variants)
    }

    /// Pre-flight, then build every requested variant
    pub async fn run(&self, requested: &[String]) -> Result<BuildSummary, BuildError> {
        let variants = self.preflight(requested).await?;
        Ok(self.execute(variants).await)
    }

    /// Build `variants` without pre-flight checks
    pub async fn execute(&self, variants: Vec<BuildVariant>) -> BuildSummary {
        let started = Instant::now();
        tracing::info!(
            "Building {} variant(s) in {} mode",
            variants.len(),
            self.ctx.config.mode
        );

        let results = match self.ctx.config.mode {
            ExecutionMode::Sequential => self.run_sequential(&variants).await,
            ExecutionMode::Parallel => self.run_parallel(&variants).await,
        };

        BuildSummary {
            results,
            order: variants,
            total: started.elapsed(),
        }
    }

    async fn run_sequential(
        &self,
        variants: &[BuildVariant],
    ) -> BTreeMap<BuildVariant, JobResult> {
        let mut results = BTreeMap::new();
        for variant in variants {
            let result = run_job(&self.ctx, variant).await;
            results.insert(variant.clone(), result);
        }
        results
    }

    async fn run_parallel(&self, variants: &[BuildVariant]) -> BTreeMap<BuildVariant, JobResult> {
        let mut join_set = JoinSet::new();
        let mut spawned = HashMap::new();

        for variant in variants.iter().cloned() {
            let ctx = Arc::clone(&self.ctx);
            let task_variant = variant.clone();
            let handle = join_set.spawn(async move { run_job(&ctx, &task_variant).await });
            spawned.insert(handle.id(), variant);
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => {
                    results.insert(result.variant.clone(), result);
                }
                Err(e) => {
                    let Some(variant) = spawned.remove(&e.id()) else {
                        tracing::warn!("Unknown build worker failed: {e}");
                        continue;
                    };
                    tracing::warn!("Build worker for {variant} crashed: {e}");
                    let output_path = self.ctx.layout.artifact_path(&variant);
                    let failure = JobFailure::Crashed {
                        message: e.to_string(),
                    };
                    results.insert(
                        variant.clone(),
                        JobResult::failed(variant, failure, output_path),
                    );
                }
            }
        }
        results
    }
}
