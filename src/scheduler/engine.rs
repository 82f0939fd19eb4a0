//! Tick-driven job scheduler.
//!
//! # Algorithm
//!
//! Each call to [`JobScheduler::tick`] at time `t`:
//!
//! 1. Releases every hold that ends at `t` (placed at `t - execution_time`).
//! 2. Takes all queued jobs with `arrival_time <= t`, ordered by the
//!    queueing policy.
//! 3. Offers each job to the worker pool under the placement policy.
//!    A placed job holds its node for `execution_time` ticks; a job with
//!    no eligible node goes back to the queue and is retried next tick.
//! 4. Samples pool occupancy into the utilization accumulator.
//! 5. Advances `t` by one.
//!
//! A job placed at `t` therefore occupies its node during ticks
//! `[t, t + execution_time)` and its capacity is available again to
//! jobs dispatched at `t + execution_time`.
//!
//! There is no terminal state. A job larger than every node stays queued
//! forever; bound runs with [`JobScheduler::run`] or
//! [`JobScheduler::run_until_idle`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::kpi::SimulationKpi;
use super::pool::{NodeId, PlacementPolicy, WorkerPool};
use super::queue::JobQueue;
use super::utilization::{UtilizationAccumulator, UtilizationSummary};
use crate::dispatching::{QueuePolicy, RuleEngine};
use crate::error::{Result, SimError};
use crate::models::{ClusterConfig, Job, JobId, JobSpec, Resources, Tick};
use crate::validation::validate_cluster;

/// A job's lifecycle as observed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job: Job,
    /// Tick at which the job was placed.
    pub start: Option<Tick>,
    /// Node that hosted the job.
    pub node: Option<NodeId>,
    /// Tick at which the job's resources were released.
    pub completion: Option<Tick>,
}

impl JobRecord {
    /// Ticks spent queued after arrival, once placed.
    pub fn wait_time(&self) -> Option<Tick> {
        self.start.map(|start| start - self.job.arrival_time)
    }

    pub fn is_placed(&self) -> bool {
        self.start.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_some()
    }
}

/// A placement made during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub job: JobId,
    pub node: NodeId,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// The tick that was simulated.
    pub tick: Tick,
    /// Jobs placed, in dispatch order.
    pub placed: Vec<Placement>,
    /// Jobs whose resources were released.
    pub completed: Vec<JobId>,
    /// Jobs still queued after the pass.
    pub pending: usize,
}

#[derive(Debug, Clone, Copy)]
struct Hold {
    job: JobId,
    node: NodeId,
    demand: Resources,
    release_at: Tick,
}

/// Discrete-time scheduler over a fixed worker pool.
///
/// # Example
///
/// ```
/// use u_jobsim::dispatching::QueuePolicy;
/// use u_jobsim::models::{ClusterConfig, JobSpec};
/// use u_jobsim::scheduler::{JobScheduler, PlacementPolicy};
///
/// let cluster = ClusterConfig::new(1, 4, 16);
/// let mut scheduler =
///     JobScheduler::with_cluster(cluster, QueuePolicy::Fcfs, PlacementPolicy::FirstFit).unwrap();
/// scheduler.add_job(JobSpec::new(0, 4, 16, 2)).unwrap();
/// scheduler.add_job(JobSpec::new(0, 4, 16, 2)).unwrap();
///
/// scheduler.run(4);
/// assert_eq!(scheduler.average_cpu_utilization(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct JobScheduler {
    queue_policy: QueuePolicy,
    placement_policy: PlacementPolicy,
    rule_engine: RuleEngine,
    queue: JobQueue,
    pool: WorkerPool,
    holds: Vec<Hold>,
    records: Vec<JobRecord>,
    utilization: UtilizationAccumulator,
    now: Tick,
}

impl JobScheduler {
    /// Creates a scheduler over the default pool (128 nodes of 24 cores
    /// and 64 memory units).
    pub fn new(queue_policy: QueuePolicy, placement_policy: PlacementPolicy) -> Self {
        Self::build(ClusterConfig::default(), queue_policy, placement_policy)
    }

    /// Creates a scheduler over a custom pool.
    pub fn with_cluster(
        cluster: ClusterConfig,
        queue_policy: QueuePolicy,
        placement_policy: PlacementPolicy,
    ) -> Result<Self> {
        validate_cluster(&cluster).map_err(SimError::InvalidCluster)?;
        Ok(Self::build(cluster, queue_policy, placement_policy))
    }

    fn build(
        cluster: ClusterConfig,
        queue_policy: QueuePolicy,
        placement_policy: PlacementPolicy,
    ) -> Self {
        let pool = WorkerPool::new(&cluster);
        let (capacity_cores, capacity_memory) = pool.total_capacity();

        Self {
            queue_policy,
            placement_policy,
            rule_engine: queue_policy.rule_engine(),
            queue: JobQueue::new(),
            pool,
            holds: Vec::new(),
            records: Vec::new(),
            utilization: UtilizationAccumulator::new(capacity_cores, capacity_memory),
            now: 0,
        }
    }

    /// Validates and queues a job. Returns its submission id.
    pub fn add_job(&mut self, spec: JobSpec) -> Result<JobId> {
        let id = JobId(self.records.len() as u64);
        let job = spec.into_job(id).map_err(SimError::InvalidJob)?;

        if !self.pool.can_ever_fit(job.demand()) {
            warn!(
                job = %id,
                cores = job.cores,
                memory = job.memory,
                "job exceeds every node's capacity and will never be placed"
            );
        }

        self.records.push(JobRecord {
            job,
            start: None,
            node: None,
            completion: None,
        });
        self.queue.enqueue(job);
        Ok(id)
    }

    /// Queues several jobs, stopping at the first invalid one.
    pub fn add_jobs<I>(&mut self, specs: I) -> Result<Vec<JobId>>
    where
        I: IntoIterator<Item = JobSpec>,
    {
        specs.into_iter().map(|spec| self.add_job(spec)).collect()
    }

    /// Simulates one tick.
    pub fn tick(&mut self) -> TickReport {
        let now = self.now;
        let mut report = TickReport {
            tick: now,
            ..TickReport::default()
        };

        self.release_expired(now, &mut report.completed);

        for job in self.queue.take_ready(now, &self.rule_engine) {
            match self.pool.allocate(job.demand(), self.placement_policy) {
                Some(node) => {
                    self.start(job, node, now, &mut report);
                }
                None => {
                    trace!(job = %job.id, tick = now, "no eligible node, requeued");
                    self.queue.requeue(job);
                }
            }
        }

        let (used_cores, used_memory) = self.pool.total_used();
        self.utilization.record(used_cores, used_memory);

        report.pending = self.queue.len();
        trace!(
            tick = now,
            placed = report.placed.len(),
            completed = report.completed.len(),
            pending = report.pending,
            running = self.holds.len(),
            "tick"
        );

        self.now += 1;
        report
    }

    /// Simulates `ticks` ticks.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Simulates until every job has completed or `max_ticks` ticks have
    /// been spent. Returns `true` if the scheduler drained.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> bool {
        for _ in 0..max_ticks {
            if self.is_idle() {
                return true;
            }
            self.tick();
        }
        self.is_idle()
    }

    fn start(&mut self, job: Job, node: NodeId, now: Tick, report: &mut TickReport) {
        if let Some(record) = self.records.get_mut(job.id.0 as usize) {
            record.start = Some(now);
            record.node = Some(node);
        }
        report.placed.push(Placement { job: job.id, node });
        debug!(
            job = %job.id,
            node,
            tick = now,
            cores = job.cores,
            memory = job.memory,
            duration = job.execution_time,
            "placed job"
        );

        if job.execution_time == 0 {
            self.pool.release(node, job.demand());
            self.complete(job.id, now);
            report.completed.push(job.id);
        } else {
            self.holds.push(Hold {
                job: job.id,
                node,
                demand: job.demand(),
                release_at: now + job.execution_time,
            });
        }
    }

    fn release_expired(&mut self, now: Tick, completed: &mut Vec<JobId>) {
        let mut expired = Vec::new();
        self.holds.retain(|hold| {
            if hold.release_at <= now {
                expired.push(*hold);
                false
            } else {
                true
            }
        });

        for hold in expired {
            self.pool.release(hold.node, hold.demand);
            self.complete(hold.job, now);
            completed.push(hold.job);
            debug!(job = %hold.job, node = hold.node, tick = now, "released job");
        }
    }

    fn complete(&mut self, id: JobId, now: Tick) {
        if let Some(record) = self.records.get_mut(id.0 as usize) {
            record.completion = Some(now);
        }
    }

    /// Whether nothing is queued or running.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.holds.is_empty()
    }

    /// Current simulated time (the next tick to run).
    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn queue_policy(&self) -> QueuePolicy {
        self.queue_policy
    }

    pub fn placement_policy(&self) -> PlacementPolicy {
        self.placement_policy
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Jobs currently holding resources.
    pub fn running_count(&self) -> usize {
        self.holds.len()
    }

    /// Lifecycle records, indexed by submission order.
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn record(&self, id: JobId) -> Option<&JobRecord> {
        self.records.get(id.0 as usize)
    }

    /// Mean core utilization over all nodes and ticks so far.
    pub fn average_cpu_utilization(&self) -> f64 {
        self.utilization.average_cpu()
    }

    /// Mean memory utilization over all nodes and ticks so far.
    pub fn average_memory_utilization(&self) -> f64 {
        self.utilization.average_memory()
    }

    /// Fraction of pool cores held right now, averaged over nodes.
    pub fn current_cpu_utilization(&self) -> f64 {
        self.pool.cpu_utilization()
    }

    /// Fraction of pool memory held right now, averaged over nodes.
    pub fn current_memory_utilization(&self) -> f64 {
        self.pool.memory_utilization()
    }

    /// Snapshot of the utilization accumulators.
    pub fn utilization(&self) -> UtilizationSummary {
        self.utilization.summary()
    }

    /// Performance indicators for the run so far.
    pub fn kpi(&self) -> SimulationKpi {
        SimulationKpi::calculate(&self.records, &self.utilization.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(
        nodes: usize,
        cores: u32,
        memory: u32,
        queue: QueuePolicy,
        placement: PlacementPolicy,
    ) -> JobScheduler {
        JobScheduler::with_cluster(ClusterConfig::new(nodes, cores, memory), queue, placement)
            .unwrap()
    }

    #[test]
    fn test_single_node_back_to_back() {
        let mut s = scheduler(1, 4, 16, QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        let first = s.add_job(JobSpec::new(0, 4, 16, 2)).unwrap();
        let second = s.add_job(JobSpec::new(0, 4, 16, 2)).unwrap();

        let t0 = s.tick();
        assert_eq!(t0.placed, vec![Placement { job: first, node: 0 }]);
        assert_eq!(t0.pending, 1);

        let t1 = s.tick();
        assert!(t1.placed.is_empty());
        assert!(t1.completed.is_empty());

        let t2 = s.tick();
        assert_eq!(t2.completed, vec![first]);
        assert_eq!(t2.placed, vec![Placement { job: second, node: 0 }]);
        assert_eq!(t2.pending, 0);

        s.tick();
        assert_eq!(s.now(), 4);
        assert_eq!(s.average_cpu_utilization(), 1.0);
        assert_eq!(s.average_memory_utilization(), 1.0);

        assert_eq!(s.record(first).unwrap().start, Some(0));
        assert_eq!(s.record(first).unwrap().completion, Some(2));
        assert_eq!(s.record(second).unwrap().start, Some(2));
        assert_eq!(s.record(second).unwrap().completion, None);

        let t4 = s.tick();
        assert_eq!(t4.completed, vec![second]);
        assert!(s.is_idle());
    }

    #[test]
    fn test_capacity_held_for_exact_duration() {
        let mut s = scheduler(1, 24, 64, QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        let before = s.pool().nodes()[0].clone();
        s.add_job(JobSpec::new(0, 5, 7, 3)).unwrap();

        for _ in 0..3 {
            s.tick();
            assert_eq!(s.pool().nodes()[0].available(), Resources::new(19, 57));
        }

        let report = s.tick();
        assert_eq!(report.completed.len(), 1);
        assert_eq!(s.pool().nodes()[0], before);
    }

    #[test]
    fn test_future_jobs_wait_for_arrival() {
        let mut s = scheduler(2, 8, 8, QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        let id = s.add_job(JobSpec::new(3, 1, 1, 1)).unwrap();

        for _ in 0..3 {
            assert!(s.tick().placed.is_empty());
        }
        assert_eq!(s.tick().placed, vec![Placement { job: id, node: 0 }]);
        assert_eq!(s.record(id).unwrap().wait_time(), Some(0));
    }

    #[test]
    fn test_best_fit_identical_nodes_picks_first() {
        let mut s = scheduler(2, 8, 16, QueuePolicy::Fcfs, PlacementPolicy::BestFit);
        s.add_job(JobSpec::new(0, 8, 4, 5)).unwrap();
        let report = s.tick();
        assert_eq!(report.placed[0].node, 0);
    }

    #[test]
    fn test_worst_fit_spreads_load() {
        let mut s = scheduler(3, 8, 16, QueuePolicy::Fcfs, PlacementPolicy::WorstFit);
        for _ in 0..3 {
            s.add_job(JobSpec::new(0, 2, 2, 10)).unwrap();
        }
        let nodes: Vec<NodeId> = s.tick().placed.iter().map(|p| p.node).collect();
        assert_eq!(nodes, vec![0, 1, 2]);
    }

    #[test]
    fn test_best_fit_packs_load() {
        let mut s = scheduler(3, 8, 16, QueuePolicy::Fcfs, PlacementPolicy::BestFit);
        for _ in 0..3 {
            s.add_job(JobSpec::new(0, 2, 2, 10)).unwrap();
        }
        let nodes: Vec<NodeId> = s.tick().placed.iter().map(|p| p.node).collect();
        assert_eq!(nodes, vec![0, 0, 0]);
    }

    #[test]
    fn test_blocked_head_does_not_stop_smaller_jobs() {
        let mut s = scheduler(1, 4, 16, QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        s.add_job(JobSpec::new(0, 3, 8, 5)).unwrap();
        let big = s.add_job(JobSpec::new(0, 4, 8, 1)).unwrap();
        let small = s.add_job(JobSpec::new(0, 1, 8, 1)).unwrap();

        let report = s.tick();
        let placed: Vec<JobId> = report.placed.iter().map(|p| p.job).collect();
        assert!(placed.contains(&small));
        assert!(!placed.contains(&big));
        assert_eq!(report.pending, 1);
    }

    #[test]
    fn test_shortest_duration_first_dispatch_order() {
        let mut s = scheduler(1, 4, 16, QueuePolicy::ShortestDurationFirst, PlacementPolicy::FirstFit);
        let long = s.add_job(JobSpec::new(0, 4, 16, 5)).unwrap();
        let short = s.add_job(JobSpec::new(0, 4, 16, 1)).unwrap();

        assert_eq!(s.tick().placed[0].job, short);
        assert_eq!(s.tick().placed[0].job, long);
    }

    #[test]
    fn test_smallest_job_first_dispatch_order() {
        let mut s = scheduler(1, 8, 32, QueuePolicy::SmallestJobFirst, PlacementPolicy::FirstFit);
        let large = s.add_job(JobSpec::new(0, 8, 32, 1)).unwrap();
        let small = s.add_job(JobSpec::new(0, 2, 8, 1)).unwrap();

        let report = s.tick();
        assert_eq!(report.placed, vec![Placement { job: small, node: 0 }]);
        assert_eq!(s.tick().placed[0].job, large);
    }

    #[test]
    fn test_oversized_job_stays_queued() {
        let mut s = scheduler(2, 4, 16, QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        s.add_job(JobSpec::new(0, 5, 1, 1)).unwrap();

        assert!(!s.run_until_idle(50));
        assert_eq!(s.now(), 50);
        assert_eq!(s.queue().len(), 1);
        assert_eq!(s.average_cpu_utilization(), 0.0);
    }

    #[test]
    fn test_run_until_idle_drains() {
        let mut s = scheduler(1, 4, 16, QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        s.add_job(JobSpec::new(0, 4, 16, 2)).unwrap();
        s.add_job(JobSpec::new(1, 4, 16, 2)).unwrap();

        assert!(s.run_until_idle(100));
        assert_eq!(s.now(), 5);
        assert!(s.records().iter().all(JobRecord::is_completed));
    }

    #[test]
    fn test_zero_duration_job_never_holds() {
        let mut s = scheduler(1, 4, 16, QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        let id = s.add_job(JobSpec::new(0, 4, 16, 0)).unwrap();

        let report = s.tick();
        assert_eq!(report.placed.len(), 1);
        assert_eq!(report.completed, vec![id]);
        assert!(s.pool().is_idle());
        assert_eq!(s.average_cpu_utilization(), 0.0);
    }

    #[test]
    fn test_no_jobs_zero_utilization() {
        let mut s = JobScheduler::new(QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        assert_eq!(s.average_cpu_utilization(), 0.0);
        s.run(24);
        assert_eq!(s.average_cpu_utilization(), 0.0);
        assert_eq!(s.average_memory_utilization(), 0.0);
        assert_eq!(s.utilization().ticks, 24);
    }

    #[test]
    fn test_default_pool_shape() {
        let s = JobScheduler::new(QueuePolicy::Fcfs, PlacementPolicy::BestFit);
        assert_eq!(s.pool().len(), 128);
        assert_eq!(s.pool().node_capacity(), Resources::new(24, 64));
        assert_eq!(s.placement_policy(), PlacementPolicy::BestFit);
        assert_eq!(s.queue_policy(), QueuePolicy::Fcfs);
    }

    #[test]
    fn test_invalid_job_rejected() {
        let mut s = JobScheduler::new(QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        assert!(matches!(
            s.add_job(JobSpec::new(0, -4, 16, 2)),
            Err(SimError::InvalidJob(_))
        ));
        assert!(s.queue().is_empty());
        assert!(s.records().is_empty());
    }

    #[test]
    fn test_invalid_cluster_rejected() {
        let result = JobScheduler::with_cluster(
            ClusterConfig::new(0, 24, 64),
            QueuePolicy::Fcfs,
            PlacementPolicy::FirstFit,
        );
        assert!(matches!(result, Err(SimError::InvalidCluster(_))));
    }

    #[test]
    fn test_availability_stays_in_bounds() {
        let mut s = scheduler(4, 8, 16, QueuePolicy::SmallestJobFirst, PlacementPolicy::WorstFit);
        for i in 0..40 {
            s.add_job(JobSpec::new(i % 7, 1 + i % 8, 2 + (i * 3) % 15, 1 + i % 4))
                .unwrap();
        }

        for _ in 0..200 {
            s.tick();
            for node in s.pool().nodes() {
                assert!(node.available().fits_within(&node.capacity()));
            }
        }
        assert!(s.is_idle());
    }

    #[test]
    fn test_current_utilization_tracks_holds() {
        let mut s = scheduler(2, 4, 16, QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        s.add_job(JobSpec::new(0, 4, 8, 2)).unwrap();
        assert_eq!(s.current_cpu_utilization(), 0.0);

        s.tick();
        assert!((s.current_cpu_utilization() - 0.5).abs() < 1e-10);
        assert!((s.current_memory_utilization() - 0.25).abs() < 1e-10);

        s.tick();
        s.tick();
        assert_eq!(s.current_cpu_utilization(), 0.0);
        assert_eq!(s.current_memory_utilization(), 0.0);
        // Averages still remember the two busy ticks.
        assert!((s.average_cpu_utilization() - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_add_jobs_ids_in_submission_order() {
        let mut s = JobScheduler::new(QueuePolicy::Fcfs, PlacementPolicy::FirstFit);
        let ids = s
            .add_jobs([JobSpec::new(0, 1, 1, 1), JobSpec::new(0, 1, 1, 1)])
            .unwrap();
        assert_eq!(ids, vec![JobId(0), JobId(1)]);
    }
}
