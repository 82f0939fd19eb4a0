//! Job workloads for simulations.
//!
//! - [`example_jobs`]: a fixed three-job demo workload.
//! - [`WorkloadGenerator`]: seeded synthetic workloads with uniform
//!   arrivals, requirements and durations. The same seed always yields
//!   the same jobs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::models::JobSpec;
use crate::validation::validate_workload;

/// Inclusive `min..=max` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: i64,
    pub max: i64,
}

impl ValueRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

/// Parameters for synthetic workloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// RNG seed.
    pub seed: u64,
    /// Number of jobs to generate.
    pub job_count: usize,
    /// Arrivals are drawn from `0..horizon`.
    pub horizon: u32,
    /// Cores per job.
    pub cores: ValueRange,
    /// Memory units per job.
    pub memory: ValueRange,
    /// Execution time per job, in ticks.
    pub duration: ValueRange,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            job_count: 200,
            horizon: 24,
            cores: ValueRange::new(1, 8),
            memory: ValueRange::new(4, 32),
            duration: ValueRange::new(1, 6),
        }
    }
}

/// The three-job demo workload: two jobs at tick 0 and one at tick 1.
pub fn example_jobs() -> Vec<JobSpec> {
    vec![
        JobSpec::new(0, 4, 16, 2),
        JobSpec::new(0, 8, 32, 3),
        JobSpec::new(1, 2, 8, 1),
    ]
}

/// Seeded synthetic workload generator.
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    config: WorkloadConfig,
    rng: StdRng,
}

impl WorkloadGenerator {
    /// Creates a generator, rejecting inverted or negative ranges.
    pub fn new(config: WorkloadConfig) -> Result<Self> {
        validate_workload(&config).map_err(SimError::InvalidWorkload)?;
        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Draws `job_count` jobs, sorted by arrival tick.
    pub fn generate(&mut self) -> Vec<JobSpec> {
        let mut jobs: Vec<JobSpec> = (0..self.config.job_count)
            .map(|_| self.next_job())
            .collect();
        jobs.sort_by_key(|job| job.arrival_time);
        jobs
    }

    fn next_job(&mut self) -> JobSpec {
        let arrival = self.rng.random_range(0..self.config.horizon);
        let cores = self.draw(self.config.cores);
        let memory = self.draw(self.config.memory);
        let duration = self.draw(self.config.duration);
        JobSpec::new(i64::from(arrival), cores, memory, duration)
    }

    fn draw(&mut self, range: ValueRange) -> i64 {
        self.rng.random_range(range.min..=range.max)
    }
}
