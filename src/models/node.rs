//! Worker node model.
//!
//! A worker node has a fixed capacity and a mutable count of what is
//! still available. Placement reserves a job's demand; completion
//! releases it. Availability never leaves `[0, capacity]`.

use serde::{Deserialize, Serialize};

/// Default number of nodes in the pool.
pub const DEFAULT_NODE_COUNT: usize = 128;
/// Default cores per node.
pub const DEFAULT_NODE_CORES: u32 = 24;
/// Default memory units per node.
pub const DEFAULT_NODE_MEMORY: u32 = 64;

/// A (cores, memory) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    pub cores: u32,
    pub memory: u32,
}

impl Resources {
    pub fn new(cores: u32, memory: u32) -> Self {
        Self { cores, memory }
    }

    /// Whether `self` fits inside `other` on both dimensions.
    #[inline]
    pub fn fits_within(&self, other: &Resources) -> bool {
        self.cores <= other.cores && self.memory <= other.memory
    }
}

/// Shape of the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of nodes.
    pub node_count: usize,
    /// Cores per node.
    pub node_cores: u32,
    /// Memory units per node.
    pub node_memory: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_count: DEFAULT_NODE_COUNT,
            node_cores: DEFAULT_NODE_CORES,
            node_memory: DEFAULT_NODE_MEMORY,
        }
    }
}

impl ClusterConfig {
    /// Creates a homogeneous cluster shape.
    pub fn new(node_count: usize, node_cores: u32, node_memory: u32) -> Self {
        Self {
            node_count,
            node_cores,
            node_memory,
        }
    }

    /// Per-node capacity.
    pub fn node_capacity(&self) -> Resources {
        Resources::new(self.node_cores, self.node_memory)
    }
}

/// A worker node with fixed capacity and mutable availability.
///
/// Only [`WorkerNode::new`] builds one, so `available <= capacity` holds
/// from the start. Nodes serialize for reporting but never deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerNode {
    capacity: Resources,
    available: Resources,
}

impl WorkerNode {
    /// Creates an idle node.
    pub fn new(capacity: Resources) -> Self {
        Self {
            capacity,
            available: capacity,
        }
    }

    pub fn capacity(&self) -> Resources {
        self.capacity
    }

    pub fn available(&self) -> Resources {
        self.available
    }

    /// Resources currently held by running jobs.
    pub fn used(&self) -> Resources {
        Resources::new(
            self.capacity.cores - self.available.cores,
            self.capacity.memory - self.available.memory,
        )
    }

    /// Whether `demand` fits in what is currently available.
    #[inline]
    pub fn can_host(&self, demand: Resources) -> bool {
        demand.fits_within(&self.available)
    }

    /// Whether `demand` could fit on this node when it is idle.
    #[inline]
    pub fn could_ever_host(&self, demand: Resources) -> bool {
        demand.fits_within(&self.capacity)
    }

    /// Reserves `demand`. Returns `false` and leaves the node untouched
    /// if it does not fit.
    pub fn reserve(&mut self, demand: Resources) -> bool {
        if !self.can_host(demand) {
            return false;
        }
        self.available.cores -= demand.cores;
        self.available.memory -= demand.memory;
        true
    }

    /// Returns `demand` to the node.
    ///
    /// Availability is clamped to capacity; releasing more than was
    /// reserved is a bookkeeping bug and trips a debug assertion.
    pub fn release(&mut self, demand: Resources) {
        debug_assert!(
            demand.fits_within(&self.used()),
            "released {demand:?} but only {:?} is in use",
            self.used()
        );
        self.available.cores = self
            .available
            .cores
            .saturating_add(demand.cores)
            .min(self.capacity.cores);
        self.available.memory = self
            .available
            .memory
            .saturating_add(demand.memory)
            .min(self.capacity.memory);
    }

    /// Whether nothing is reserved.
    pub fn is_idle(&self) -> bool {
        self.available == self.capacity
    }

    /// Fraction of cores in use (0.0..=1.0).
    pub fn cpu_utilization(&self) -> f64 {
        ratio(self.used().cores, self.capacity.cores)
    }

    /// Fraction of memory in use (0.0..=1.0).
    pub fn memory_utilization(&self) -> f64 {
        ratio(self.used().memory, self.capacity.memory)
    }
}

fn ratio(used: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        0.0
    } else {
        f64::from(used) / f64::from(capacity)
    }
}
