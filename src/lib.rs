//! Discrete-time job scheduling simulator.
//!
//! Jobs arrive at integer ticks, wait in a queue, and are placed on a
//! fixed pool of identical worker nodes with limited cores and memory.
//! Each placed job holds its resources for exactly its execution time.
//! The simulator reports how well the pool was used.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Job`, `JobSpec`, `WorkerNode`, `ClusterConfig`
//! - **`dispatching`**: Queueing policies (FCFS, smallest-job-first,
//!   shortest-duration-first) built from composable dispatching rules
//! - **`scheduler`**: Job queue, worker pool with First/Best/Worst Fit
//!   placement, the tick loop, utilization and KPIs
//! - **`workload`**: Demo and seeded synthetic workloads
//! - **`config`**: TOML simulation configuration
//! - **`report`**: Policy sweeps and CSV output
//! - **`validation`**: Input integrity checks
//!
//! # Example
//!
//! ```
//! use u_jobsim::dispatching::QueuePolicy;
//! use u_jobsim::models::ClusterConfig;
//! use u_jobsim::scheduler::{JobScheduler, PlacementPolicy};
//! use u_jobsim::workload::example_jobs;
//!
//! let mut scheduler = JobScheduler::with_cluster(
//!     ClusterConfig::default(),
//!     QueuePolicy::Fcfs,
//!     PlacementPolicy::FirstFit,
//! ).unwrap();
//! scheduler.add_jobs(example_jobs()).unwrap();
//! scheduler.run(24);
//!
//! assert!(scheduler.average_cpu_utilization() > 0.0);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Feitelson et al. (1997), "Theory and Practice in Parallel Job Scheduling"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod report;
pub mod scheduler;
pub mod validation;
pub mod workload;

pub use error::{Result, SimError};
