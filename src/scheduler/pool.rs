//! Worker pool and bin-packing placement.
//!
//! The pool is a flat, fixed-size array of nodes. Placement selects a
//! node *index* among the eligible nodes (available cores and memory both
//! cover the demand) and reserves on that node in place, so the
//! reservation persists until it is explicitly released.
//!
//! # Policies
//!
//! | Policy | Choice among eligible nodes |
//! |--------|-----------------------------|
//! | First Fit | Lowest index |
//! | Best Fit | Smallest (available cores, available memory) |
//! | Worst Fit | Largest (available cores, available memory) |
//!
//! Best and Worst Fit compare cores first and memory second; remaining
//! ties go to the lowest index.
//!
//! # Reference
//! Johnson (1974), "Fast Algorithms for Bin Packing", JCSS 8(3)

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use crate::dispatching::PolicySelector;
use crate::error::SimError;
use crate::models::{ClusterConfig, Resources, WorkerNode};

/// Index of a node in the pool.
pub type NodeId = usize;

/// How a node is chosen among the eligible ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "PolicySelector")]
pub enum PlacementPolicy {
    /// First eligible node in pool order.
    FirstFit,
    /// Tightest fit: least available capacity.
    BestFit,
    /// Loosest fit: most available capacity.
    WorstFit,
}

impl PlacementPolicy {
    /// Every policy, in code order.
    pub const ALL: [PlacementPolicy; 3] = [
        PlacementPolicy::FirstFit,
        PlacementPolicy::BestFit,
        PlacementPolicy::WorstFit,
    ];

    /// Numeric code used in reports (0, 1, 2).
    pub fn code(self) -> u8 {
        match self {
            PlacementPolicy::FirstFit => 0,
            PlacementPolicy::BestFit => 1,
            PlacementPolicy::WorstFit => 2,
        }
    }

    /// Looks up a policy by numeric code.
    pub fn from_code(code: i64) -> Result<Self, SimError> {
        match code {
            0 => Ok(PlacementPolicy::FirstFit),
            1 => Ok(PlacementPolicy::BestFit),
            2 => Ok(PlacementPolicy::WorstFit),
            other => Err(SimError::UnknownPlacementPolicy(other.to_string())),
        }
    }

    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            PlacementPolicy::FirstFit => "first-fit",
            PlacementPolicy::BestFit => "best-fit",
            PlacementPolicy::WorstFit => "worst-fit",
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlacementPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ff" | "first-fit" => Ok(PlacementPolicy::FirstFit),
            "bf" | "best-fit" => Ok(PlacementPolicy::BestFit),
            "wf" | "worst-fit" => Ok(PlacementPolicy::WorstFit),
            other => match other.parse::<i64>() {
                Ok(code) => PlacementPolicy::from_code(code),
                Err(_) => Err(SimError::UnknownPlacementPolicy(s.to_string())),
            },
        }
    }
}

impl TryFrom<PolicySelector> for PlacementPolicy {
    type Error = SimError;

    fn try_from(selector: PolicySelector) -> Result<Self, Self::Error> {
        match selector {
            PolicySelector::Code(code) => PlacementPolicy::from_code(code),
            PolicySelector::Name(name) => name.parse(),
        }
    }
}

/// Fixed-size pool of worker nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPool {
    nodes: Vec<WorkerNode>,
    node_capacity: Resources,
}

impl WorkerPool {
    /// Creates a pool of identical idle nodes.
    pub fn new(cluster: &ClusterConfig) -> Self {
        let node_capacity = cluster.node_capacity();
        Self {
            nodes: vec![WorkerNode::new(node_capacity); cluster.node_count],
            node_capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[WorkerNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&WorkerNode> {
        self.nodes.get(id)
    }

    /// Capacity of each node.
    pub fn node_capacity(&self) -> Resources {
        self.node_capacity
    }

    /// Indices of nodes that can host `demand` right now, in pool order.
    pub fn find_eligible_nodes(&self, demand: Resources) -> Vec<NodeId> {
        self.eligible(demand).map(|(id, _)| id).collect()
    }

    /// Whether some node could host `demand` when idle.
    pub fn can_ever_fit(&self, demand: Resources) -> bool {
        self.nodes.iter().any(|node| node.could_ever_host(demand))
    }

    /// Chooses a node for `demand` without reserving.
    pub fn select_node(&self, demand: Resources, policy: PlacementPolicy) -> Option<NodeId> {
        let mut eligible = self.eligible(demand);
        match policy {
            PlacementPolicy::FirstFit => eligible.next().map(|(id, _)| id),
            // `min_by_key` keeps the first of equal minima.
            PlacementPolicy::BestFit => eligible
                .min_by_key(|(_, node)| slack(node))
                .map(|(id, _)| id),
            // `max_by_key` keeps the last of equal maxima, so the index is
            // reversed to prefer the lowest one.
            PlacementPolicy::WorstFit => eligible
                .max_by_key(|(id, node)| (slack(node), Reverse(*id)))
                .map(|(id, _)| id),
        }
    }

    /// Chooses a node and reserves `demand` on it.
    ///
    /// Returns `None`, with the pool unchanged, if no node is eligible.
    pub fn allocate(&mut self, demand: Resources, policy: PlacementPolicy) -> Option<NodeId> {
        let id = self.select_node(demand, policy)?;
        let node = self.nodes.get_mut(id)?;
        node.reserve(demand).then_some(id)
    }

    /// Returns `demand` to node `id`.
    pub fn release(&mut self, id: NodeId, demand: Resources) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.release(demand);
        }
    }

    /// Cores and memory in use, summed over all nodes.
    pub fn total_used(&self) -> (u64, u64) {
        self.nodes.iter().fold((0, 0), |(cores, memory), node| {
            let used = node.used();
            (cores + u64::from(used.cores), memory + u64::from(used.memory))
        })
    }

    /// Cores and memory capacity, summed over all nodes.
    pub fn total_capacity(&self) -> (u64, u64) {
        let count = self.nodes.len() as u64;
        (
            count * u64::from(self.node_capacity.cores),
            count * u64::from(self.node_capacity.memory),
        )
    }

    /// Mean core utilization over nodes (0.0..=1.0).
    pub fn cpu_utilization(&self) -> f64 {
        self.mean(WorkerNode::cpu_utilization)
    }

    /// Mean memory utilization over nodes (0.0..=1.0).
    pub fn memory_utilization(&self) -> f64 {
        self.mean(WorkerNode::memory_utilization)
    }

    /// Whether no node holds any reservation.
    pub fn is_idle(&self) -> bool {
        self.nodes.iter().all(WorkerNode::is_idle)
    }

    fn eligible(&self, demand: Resources) -> impl Iterator<Item = (NodeId, &WorkerNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.can_host(demand))
    }

    fn mean(&self, f: impl Fn(&WorkerNode) -> f64) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.iter().map(f).sum::<f64>() / self.nodes.len() as f64
    }
}

fn slack(node: &WorkerNode) -> (u32, u32) {
    let available = node.available();
    (available.cores, available.memory)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(count: usize, cores: u32, memory: u32) -> WorkerPool {
        WorkerPool::new(&ClusterConfig::new(count, cores, memory))
    }

    /// Pool of 4 nodes (24/64) pre-loaded to availabilities
    /// [(20, 48), (8, 32), (8, 16), (20, 60)].
    fn uneven_pool() -> WorkerPool {
        let mut p = pool(4, 24, 64);
        p.nodes[0].reserve(Resources::new(4, 16));
        p.nodes[1].reserve(Resources::new(16, 32));
        p.nodes[2].reserve(Resources::new(16, 48));
        p.nodes[3].reserve(Resources::new(4, 4));
        p
    }

    #[test]
    fn test_find_eligible_nodes() {
        let p = uneven_pool();
        assert_eq!(p.find_eligible_nodes(Resources::new(8, 20)), vec![0, 1, 3]);
        assert_eq!(p.find_eligible_nodes(Resources::new(21, 1)), Vec::<NodeId>::new());
    }

    #[test]
    fn test_first_fit() {
        let p = uneven_pool();
        assert_eq!(p.select_node(Resources::new(8, 20), PlacementPolicy::FirstFit), Some(0));
        assert_eq!(p.select_node(Resources::new(8, 50), PlacementPolicy::FirstFit), Some(3));
    }

    #[test]
    fn test_best_fit_prefers_fewest_cores_then_memory() {
        let p = uneven_pool();
        // Eligible: 0 (20,48), 1 (8,32), 2 (8,16), 3 (20,60); nodes 1 and 2
        // tie on cores, node 2 has less memory.
        assert_eq!(p.select_node(Resources::new(4, 8), PlacementPolicy::BestFit), Some(2));
        // Node 2 is excluded by memory.
        assert_eq!(p.select_node(Resources::new(4, 20), PlacementPolicy::BestFit), Some(1));
    }

    #[test]
    fn test_worst_fit_prefers_most_cores_then_memory() {
        let p = uneven_pool();
        // Nodes 0 and 3 tie on cores, node 3 has more memory.
        assert_eq!(p.select_node(Resources::new(4, 8), PlacementPolicy::WorstFit), Some(3));
    }

    #[test]
    fn test_identical_nodes_tie_to_first() {
        let p = pool(2, 8, 16);
        let demand = Resources::new(8, 1);
        for policy in PlacementPolicy::ALL {
            assert_eq!(p.select_node(demand, policy), Some(0), "{policy}");
        }
    }

    #[test]
    fn test_best_fit_never_picks_more_slack() {
        let p = uneven_pool();
        let demand = Resources::new(2, 4);
        let chosen = p.select_node(demand, PlacementPolicy::BestFit).unwrap();
        let chosen_slack = slack(&p.nodes[chosen]);
        for id in p.find_eligible_nodes(demand) {
            assert!(chosen_slack <= slack(&p.nodes[id]));
        }

        let chosen = p.select_node(demand, PlacementPolicy::WorstFit).unwrap();
        let chosen_slack = slack(&p.nodes[chosen]);
        for id in p.find_eligible_nodes(demand) {
            assert!(chosen_slack >= slack(&p.nodes[id]));
        }
    }

    #[test]
    fn test_allocate_persists_reservation() {
        let mut p = pool(2, 8, 16);
        assert_eq!(p.allocate(Resources::new(6, 10), PlacementPolicy::FirstFit), Some(0));
        assert_eq!(p.nodes()[0].available(), Resources::new(2, 6));

        // Node 0 no longer fits; first fit moves on.
        assert_eq!(p.allocate(Resources::new(6, 10), PlacementPolicy::FirstFit), Some(1));
        assert_eq!(p.allocate(Resources::new(6, 10), PlacementPolicy::FirstFit), None);
        assert_eq!(p.total_used(), (12, 20));
        assert_eq!(p.total_capacity(), (16, 32));

        p.release(0, Resources::new(6, 10));
        assert!(p.nodes()[0].is_idle());
        assert!(!p.is_idle());
    }

    #[test]
    fn test_utilization() {
        let mut p = pool(2, 4, 16);
        p.allocate(Resources::new(4, 8), PlacementPolicy::FirstFit);
        assert!((p.cpu_utilization() - 0.5).abs() < 1e-10);
        assert!((p.memory_utilization() - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_can_ever_fit() {
        let p = pool(3, 24, 64);
        assert!(p.can_ever_fit(Resources::new(24, 64)));
        assert!(!p.can_ever_fit(Resources::new(24, 65)));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("best-fit".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::BestFit);
        assert_eq!("WF".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::WorstFit);
        assert_eq!("0".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::FirstFit);
        assert!(matches!(
            "next-fit".parse::<PlacementPolicy>(),
            Err(SimError::UnknownPlacementPolicy(_))
        ));
        assert!(PlacementPolicy::from_code(3).is_err());
    }

    #[test]
    fn test_policy_codes() {
        for policy in PlacementPolicy::ALL {
            assert_eq!(PlacementPolicy::from_code(i64::from(policy.code())).unwrap(), policy);
        }
    }
}
