//! Simulation configuration (TOML).
//!
//! ```toml
//! queue_policy = "smallest-job-first"   # or a code: 0, 1, 2
//! placement_policy = "best-fit"
//! ticks = 24
//!
//! [cluster]
//! node_count = 128
//! node_cores = 24
//! node_memory = 64
//!
//! [workload]          # optional synthetic jobs
//! seed = 42
//! job_count = 200
//!
//! [[jobs]]            # optional explicit jobs; take precedence
//! arrival_time = 0
//! cores = 4
//! memory = 16
//! execution_time = 2
//! ```
//!
//! Every field is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dispatching::QueuePolicy;
use crate::error::Result;
use crate::models::{ClusterConfig, JobSpec};
use crate::scheduler::{JobScheduler, PlacementPolicy};
use crate::workload::{example_jobs, WorkloadConfig, WorkloadGenerator};

/// Default simulated horizon, in ticks.
pub const DEFAULT_TICKS: u64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub queue_policy: QueuePolicy,
    pub placement_policy: PlacementPolicy,
    /// Ticks to simulate.
    pub ticks: u64,
    pub cluster: ClusterConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<WorkloadConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<JobSpec>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            queue_policy: QueuePolicy::Fcfs,
            placement_policy: PlacementPolicy::FirstFit,
            ticks: DEFAULT_TICKS,
            cluster: ClusterConfig::default(),
            workload: None,
            jobs: Vec::new(),
        }
    }
}

impl SimConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Jobs to submit: the explicit list if any, else a generated
    /// workload if configured, else the demo workload.
    pub fn jobs(&self) -> Result<Vec<JobSpec>> {
        if !self.jobs.is_empty() {
            return Ok(self.jobs.clone());
        }
        match self.workload {
            Some(workload) => Ok(WorkloadGenerator::new(workload)?.generate()),
            None => Ok(example_jobs()),
        }
    }

    /// Builds a scheduler for the configured cluster and policies, with
    /// [`jobs`](Self::jobs) already submitted.
    pub fn build_scheduler(&self) -> Result<JobScheduler> {
        let mut scheduler =
            JobScheduler::with_cluster(self.cluster, self.queue_policy, self.placement_policy)?;
        scheduler.add_jobs(self.jobs()?)?;
        Ok(scheduler)
    }
}
