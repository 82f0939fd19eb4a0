//! Utilization accounting.
//!
//! Each tick the scheduler samples how many cores and memory units are
//! held across the pool. The accumulator keeps integer occupancy sums,
//! so the lifetime averages are exact ratios:
//!
//! ```text
//! avg_cpu = Σ_ticks used_cores / (ticks × Σ_nodes capacity_cores)
//! ```
//!
//! For a homogeneous pool this equals the mean over nodes and ticks of
//! `used / capacity`.

use serde::{Deserialize, Serialize};

/// Running occupancy sums. Owned by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct UtilizationAccumulator {
    capacity_cores: u64,
    capacity_memory: u64,
    ticks: u64,
    core_ticks: u128,
    memory_ticks: u128,
    peak_cores: u64,
    peak_memory: u64,
}

/// Immutable snapshot of the utilization observed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSummary {
    /// Ticks sampled.
    pub ticks: u64,
    /// Mean fraction of cores in use (0.0..=1.0).
    pub avg_cpu: f64,
    /// Mean fraction of memory in use (0.0..=1.0).
    pub avg_memory: f64,
    /// Highest single-tick core fraction.
    pub peak_cpu: f64,
    /// Highest single-tick memory fraction.
    pub peak_memory: f64,
}

impl UtilizationAccumulator {
    /// Creates an accumulator for a pool with the given total capacity.
    pub fn new(capacity_cores: u64, capacity_memory: u64) -> Self {
        Self {
            capacity_cores,
            capacity_memory,
            ..Self::default()
        }
    }

    /// Records one tick of occupancy.
    pub fn record(&mut self, used_cores: u64, used_memory: u64) {
        debug_assert!(used_cores <= self.capacity_cores);
        debug_assert!(used_memory <= self.capacity_memory);

        self.ticks += 1;
        self.core_ticks += u128::from(used_cores);
        self.memory_ticks += u128::from(used_memory);
        self.peak_cores = self.peak_cores.max(used_cores);
        self.peak_memory = self.peak_memory.max(used_memory);
    }

    /// Ticks recorded so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Mean core utilization; 0.0 before the first tick.
    pub fn average_cpu(&self) -> f64 {
        average(self.core_ticks, self.capacity_cores, self.ticks)
    }

    /// Mean memory utilization; 0.0 before the first tick.
    pub fn average_memory(&self) -> f64 {
        average(self.memory_ticks, self.capacity_memory, self.ticks)
    }

    pub fn summary(&self) -> UtilizationSummary {
        UtilizationSummary {
            ticks: self.ticks,
            avg_cpu: self.average_cpu(),
            avg_memory: self.average_memory(),
            peak_cpu: average(u128::from(self.peak_cores), self.capacity_cores, 1),
            peak_memory: average(u128::from(self.peak_memory), self.capacity_memory, 1),
        }
    }
}

fn average(occupied: u128, capacity: u64, ticks: u64) -> f64 {
    let denominator = u128::from(capacity) * u128::from(ticks);
    if denominator == 0 {
        0.0
    } else {
        occupied as f64 / denominator as f64
    }
}
