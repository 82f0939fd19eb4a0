//! Simulation quality metrics (KPIs).
//!
//! Computes scheduling performance indicators from the job lifecycle
//! records and the utilization snapshot of a run.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Avg CPU / Memory | Mean fraction of pool capacity in use per tick |
//! | Peak CPU / Memory | Highest single-tick fraction |
//! | Avg Wait | Mean of (start - arrival) over placed jobs |
//! | Max Wait | Longest single wait |
//! | Makespan | Latest completion tick |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use super::engine::JobRecord;
use super::utilization::UtilizationSummary;
use crate::models::Tick;

/// Simulation performance indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationKpi {
    /// Utilization over the observed ticks.
    pub utilization: UtilizationSummary,
    /// Jobs accepted by the scheduler.
    pub jobs_submitted: usize,
    /// Jobs that have been placed (running or done).
    pub jobs_placed: usize,
    /// Jobs whose resources have been released.
    pub jobs_completed: usize,
    /// Jobs never placed so far.
    pub jobs_pending: usize,
    /// Mean wait (start - arrival) over placed jobs, in ticks.
    pub avg_wait_ticks: f64,
    /// Longest wait of any placed job, in ticks.
    pub max_wait_ticks: Tick,
    /// Latest completion tick (0 if nothing completed).
    pub makespan: Tick,
}

impl SimulationKpi {
    /// Computes KPIs from lifecycle records and a utilization snapshot.
    pub fn calculate(records: &[JobRecord], utilization: &UtilizationSummary) -> Self {
        let mut jobs_placed = 0usize;
        let mut jobs_completed = 0usize;
        let mut total_wait: u64 = 0;
        let mut max_wait: Tick = 0;
        let mut makespan: Tick = 0;

        for record in records {
            if let Some(wait) = record.wait_time() {
                jobs_placed += 1;
                total_wait += wait;
                max_wait = max_wait.max(wait);
            }
            if let Some(completion) = record.completion {
                jobs_completed += 1;
                makespan = makespan.max(completion);
            }
        }

        let avg_wait_ticks = if jobs_placed == 0 {
            0.0
        } else {
            total_wait as f64 / jobs_placed as f64
        };

        Self {
            utilization: *utilization,
            jobs_submitted: records.len(),
            jobs_placed,
            jobs_completed,
            jobs_pending: records.len() - jobs_placed,
            avg_wait_ticks,
            max_wait_ticks: max_wait,
            makespan,
        }
    }

    /// Whether every submitted job has completed.
    pub fn all_completed(&self) -> bool {
        self.jobs_completed == self.jobs_submitted
    }
}
