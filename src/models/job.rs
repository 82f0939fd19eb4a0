//! Job model.
//!
//! A job is a unit of work submitted to the cluster: it becomes eligible
//! at its arrival tick, needs a fixed amount of cores and memory on a
//! single node, and holds them for its execution time once placed.
//!
//! Submissions arrive as [`JobSpec`] (signed fields, as read from config
//! files or the command line) and are validated into an immutable [`Job`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Resources;
use crate::validation::{validate_job, ValidationError};

/// Simulated time, in ticks since the start of the simulation.
pub type Tick = u64;

/// Submission-order identifier assigned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// An unvalidated job submission.
///
/// Fields are signed so that malformed input can be represented and
/// rejected instead of wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Tick at which the job becomes eligible for dispatch.
    pub arrival_time: i64,
    /// Cores needed on a single node.
    pub cores: i64,
    /// Memory units needed on a single node.
    pub memory: i64,
    /// Ticks the job holds its node once placed.
    pub execution_time: i64,
}

impl JobSpec {
    /// Creates a submission.
    pub fn new(arrival_time: i64, cores: i64, memory: i64, execution_time: i64) -> Self {
        Self {
            arrival_time,
            cores,
            memory,
            execution_time,
        }
    }

    /// Validates the submission and turns it into a [`Job`].
    pub fn into_job(self, id: JobId) -> Result<Job, Vec<ValidationError>> {
        validate_job(&self)?;

        // Every field is range-checked above, so these casts are lossless.
        Ok(Job {
            id,
            arrival_time: self.arrival_time as Tick,
            cores: self.cores as u32,
            memory: self.memory as u32,
            execution_time: self.execution_time as Tick,
        })
    }
}

/// A validated, immutable job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Submission-order identifier.
    pub id: JobId,
    /// Tick at which the job becomes eligible.
    pub arrival_time: Tick,
    /// Cores required.
    pub cores: u32,
    /// Memory units required.
    pub memory: u32,
    /// Ticks the job occupies its node.
    pub execution_time: Tick,
}

impl Job {
    /// Creates a job directly from unsigned fields.
    pub fn new(id: JobId, arrival_time: Tick, cores: u32, memory: u32, execution_time: Tick) -> Self {
        Self {
            id,
            arrival_time,
            cores,
            memory,
            execution_time,
        }
    }

    /// Resources the job reserves on its node.
    #[inline]
    pub fn demand(&self) -> Resources {
        Resources::new(self.cores, self.memory)
    }

    /// Combined resource footprint (cores + memory).
    #[inline]
    pub fn footprint(&self) -> u64 {
        u64::from(self.cores) + u64::from(self.memory)
    }

    /// Whether the job has arrived by `now`.
    #[inline]
    pub fn is_ready(&self, now: Tick) -> bool {
        self.arrival_time <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_spec_into_job() {
        let job = JobSpec::new(3, 4, 16, 2).into_job(JobId(7)).unwrap();

        assert_eq!(job.id, JobId(7));
        assert_eq!(job.arrival_time, 3);
        assert_eq!(job.cores, 4);
        assert_eq!(job.memory, 16);
        assert_eq!(job.execution_time, 2);
        assert_eq!(job.demand(), Resources::new(4, 16));
    }

    #[test]
    fn test_negative_spec_rejected() {
        let errors = JobSpec::new(0, -1, 16, -2).into_job(JobId(0)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::NegativeValue));
    }

    #[test]
    fn test_footprint() {
        let job = Job::new(JobId(0), 0, 8, 32, 3);
        assert_eq!(job.footprint(), 40);
    }

    #[test]
    fn test_readiness() {
        let job = Job::new(JobId(0), 5, 1, 1, 1);
        assert!(!job.is_ready(4));
        assert!(job.is_ready(5));
        assert!(job.is_ready(6));
    }

    #[test]
    fn test_job_id_display() {
        assert_eq!(JobId(12).to_string(), "job-12");
    }
}
