//! Simulation domain models.
//!
//! Plain data types shared by the queue, the worker pool and the
//! scheduler. Nothing here knows about policies.
//!
//! | Type | Role |
//! |------|------|
//! | `Job` / `JobSpec` | Work unit and its unvalidated submission |
//! | `WorkerNode` | Node with fixed capacity and mutable availability |
//! | `Resources` | (cores, memory) pair |
//! | `ClusterConfig` | Pool shape (node count, per-node capacity) |

mod job;
mod node;

pub use job::{Job, JobId, JobSpec, Tick};
pub use node::{
    ClusterConfig, Resources, WorkerNode, DEFAULT_NODE_CORES, DEFAULT_NODE_COUNT,
    DEFAULT_NODE_MEMORY,
};
