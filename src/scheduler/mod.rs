//! Tick-driven scheduling engine and its containers.
//!
//! # Components
//!
//! - **`JobQueue`**: backlog of jobs awaiting dispatch
//! - **`WorkerPool`**: fixed array of nodes plus First/Best/Worst Fit placement
//! - **`JobScheduler`**: the per-tick dispatch loop
//! - **`UtilizationAccumulator`** / **`SimulationKpi`**: run metrics
//!
//! A scheduler owns its queue and pool outright. Independent simulations
//! (for example one per policy pair) share no mutable state.

mod engine;
mod kpi;
mod pool;
mod queue;
mod utilization;

pub use engine::{JobRecord, JobScheduler, Placement, TickReport};
pub use kpi::SimulationKpi;
pub use pool::{NodeId, PlacementPolicy, WorkerPool};
pub use queue::JobQueue;
pub use utilization::{UtilizationAccumulator, UtilizationSummary};
