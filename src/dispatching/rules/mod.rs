//! Built-in dispatching rules.
//!
//! - **FCFS**: arrival tick
//! - **SJF**: combined resource footprint
//! - **SDF**: execution time
//!
//! # Score Convention
//! All rules return lower scores for jobs that should go first.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Smith (1956), "Various optimizers for single-stage production"

use super::{DispatchingRule, RuleScore};
use crate::models::Job;

/// First Come, First Served.
///
/// Scores by arrival tick. Jobs that arrived together tie.
#[derive(Debug, Clone, Copy)]
pub struct Fcfs;

impl DispatchingRule for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn evaluate(&self, job: &Job) -> RuleScore {
        job.arrival_time
    }

    fn description(&self) -> &'static str {
        "First Come, First Served"
    }
}

/// Smallest Job First.
///
/// Scores by weighted footprint `cores * core_weight + memory * memory_weight`.
/// The default weights (1, 1) give plain `cores + memory`.
#[derive(Debug, Clone, Copy)]
pub struct SmallestJob {
    /// Weight per requested core.
    pub core_weight: u64,
    /// Weight per requested memory unit.
    pub memory_weight: u64,
}

impl Default for SmallestJob {
    fn default() -> Self {
        Self {
            core_weight: 1,
            memory_weight: 1,
        }
    }
}

impl SmallestJob {
    /// Creates an SJF rule with custom weights.
    pub fn with_weights(core_weight: u64, memory_weight: u64) -> Self {
        Self {
            core_weight,
            memory_weight,
        }
    }
}

impl DispatchingRule for SmallestJob {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn evaluate(&self, job: &Job) -> RuleScore {
        u64::from(job.cores)
            .saturating_mul(self.core_weight)
            .saturating_add(u64::from(job.memory).saturating_mul(self.memory_weight))
    }

    fn description(&self) -> &'static str {
        "Smallest Job First"
    }
}

/// Shortest Duration First.
///
/// Scores by execution time. Minimizes mean flow time on a single
/// machine (Smith's rule with unit weights).
#[derive(Debug, Clone, Copy)]
pub struct ShortestDuration;

impl DispatchingRule for ShortestDuration {
    fn name(&self) -> &'static str {
        "SDF"
    }

    fn evaluate(&self, job: &Job) -> RuleScore {
        job.execution_time
    }

    fn description(&self) -> &'static str {
        "Shortest Duration First"
    }
}
