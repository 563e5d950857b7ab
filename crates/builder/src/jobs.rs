//! Parallel job accounting
//!
//! External tools own their parallelism; recipes only decide how many jobs
//! to hand them. The count comes from `tools.build:jobs` and can be lowered
//! by a memory-aware governor when per-job peak consumption would exceed
//! what the machine has available.

use ferrite_events::{AppEvent, BuildEvent, EventEmitter};
use ferrite_recipe::{conf::keys, RecipeContext};
use sysinfo::System;

/// Job count for external build tools
#[must_use]
pub fn build_jobs(ctx: &RecipeContext) -> usize {
    ctx.conf
        .get_int(keys::BUILD_JOBS)
        .and_then(|j| usize::try_from(j).ok())
        .filter(|j| *j > 0)
        .unwrap_or_else(num_cpus::get)
}

/// Lower a job count so that `jobs * budget` fits into available memory
///
/// Returns at least one job; emits an event when the count was reduced.
#[must_use]
pub fn memory_governed_jobs(ctx: &RecipeContext, jobs: usize, per_job_budget_mb: u64) -> usize {
    if per_job_budget_mb == 0 {
        return jobs;
    }
    let mut system = System::new();
    system.refresh_memory();
    let available_mb = system.available_memory() / (1024 * 1024);
    let affordable = usize::try_from(available_mb / per_job_budget_mb).unwrap_or(usize::MAX);
    let effective = jobs.min(affordable).max(1);
    if effective < jobs {
        ctx.emit(AppEvent::Build(BuildEvent::JobsReduced {
            requested: jobs,
            effective,
            reason: format!("{available_mb} MB available, {per_job_budget_mb} MB per job"),
        }));
    }
    effective
}

/// Governed job count using the budget from the host configuration
#[must_use]
pub fn governed_build_jobs(ctx: &RecipeContext) -> usize {
    let jobs = build_jobs(ctx);
    match ctx
        .conf
        .get_int(keys::JOB_MEMORY_BUDGET_MB)
        .and_then(|b| u64::try_from(b).ok())
    {
        Some(budget) => memory_governed_jobs(ctx, jobs, budget),
        None => jobs,
    }
}
