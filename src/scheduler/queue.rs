//! Pending job backlog.
//!
//! Jobs sit here from submission until placement. Jobs that have not
//! arrived yet, or that found no node, stay queued; nothing is ever
//! dropped. The backlog is kept in submission (`JobId`) order.

use std::collections::VecDeque;

use crate::dispatching::RuleEngine;
use crate::models::{Job, Tick};

/// FIFO backlog of jobs awaiting dispatch.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a newly submitted job.
    pub fn enqueue(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    /// Puts back a job that could not be placed this pass, at its
    /// submission-order position.
    pub fn requeue(&mut self, job: Job) {
        let position = self.jobs.partition_point(|queued| queued.id < job.id);
        self.jobs.insert(position, job);
    }

    /// First job in queue order that has arrived by `now`.
    pub fn peek_ready(&self, now: Tick) -> Option<&Job> {
        self.jobs.iter().find(|job| job.is_ready(now))
    }

    /// Removes and returns the first job in queue order that has
    /// arrived by `now`, or `None` if nothing is ready.
    pub fn dequeue_ready(&mut self, now: Tick) -> Option<Job> {
        let position = self.jobs.iter().position(|job| job.is_ready(now))?;
        self.jobs.remove(position)
    }

    /// Removes every job that has arrived by `now`, ordered by `engine`.
    ///
    /// Jobs still in the future keep their relative order.
    pub fn take_ready(&mut self, now: Tick, engine: &RuleEngine) -> Vec<Job> {
        let (mut ready, waiting): (Vec<Job>, Vec<Job>) =
            self.jobs.drain(..).partition(|job| job.is_ready(now));
        self.jobs = waiting.into();
        engine.sort(&mut ready);
        ready
    }

    /// Number of ready jobs at `now`.
    pub fn ready_count(&self, now: Tick) -> usize {
        self.jobs.iter().filter(|job| job.is_ready(now)).count()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}
