//! Queueing policies and the rule engine that orders ready jobs.
//!
//! Each dispatch pass, the scheduler takes every job that has arrived
//! and sorts it with the [`RuleEngine`] built for the active
//! [`QueuePolicy`]. Jobs are then offered to the worker pool in that
//! order.
//!
//! # Usage
//!
//! ```
//! use u_jobsim::dispatching::{QueuePolicy, RuleEngine, rules};
//!
//! let engine = QueuePolicy::ShortestDurationFirst.rule_engine();
//! let custom = RuleEngine::new()
//!     .with_rule(rules::SmallestJob::default())
//!     .with_tie_breaker(rules::Fcfs);
//! # let _ = (engine, custom);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod engine;
pub mod rules;

pub use engine::{RuleEngine, TieBreaker};

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::error::SimError;
use crate::models::Job;

/// Score returned by a dispatching rule.
///
/// Lower scores = dispatched first.
pub type RuleScore = u64;

/// A rule that scores a job for queue ordering.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "FCFS", "SJF").
    fn name(&self) -> &'static str;

    /// Scores a job; lower is dispatched first.
    fn evaluate(&self, job: &Job) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// A policy selector as written in configuration: a name or the
/// numeric code used in reports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PolicySelector {
    Code(i64),
    Name(String),
}

/// Order in which ready jobs are offered to the pool.
///
/// Fixed for the lifetime of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "PolicySelector")]
pub enum QueuePolicy {
    /// First come, first served: by arrival tick.
    Fcfs,
    /// Smallest combined footprint (cores + memory) first.
    SmallestJobFirst,
    /// Shortest execution time first.
    ShortestDurationFirst,
}

impl QueuePolicy {
    /// Every policy, in code order.
    pub const ALL: [QueuePolicy; 3] = [
        QueuePolicy::Fcfs,
        QueuePolicy::SmallestJobFirst,
        QueuePolicy::ShortestDurationFirst,
    ];

    /// Numeric code used in reports (0, 1, 2).
    pub fn code(self) -> u8 {
        match self {
            QueuePolicy::Fcfs => 0,
            QueuePolicy::SmallestJobFirst => 1,
            QueuePolicy::ShortestDurationFirst => 2,
        }
    }

    /// Looks up a policy by numeric code.
    pub fn from_code(code: i64) -> Result<Self, SimError> {
        match code {
            0 => Ok(QueuePolicy::Fcfs),
            1 => Ok(QueuePolicy::SmallestJobFirst),
            2 => Ok(QueuePolicy::ShortestDurationFirst),
            other => Err(SimError::UnknownQueuePolicy(other.to_string())),
        }
    }

    /// Canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            QueuePolicy::Fcfs => "fcfs",
            QueuePolicy::SmallestJobFirst => "smallest-job-first",
            QueuePolicy::ShortestDurationFirst => "shortest-duration-first",
        }
    }

    /// Builds the rule engine implementing this policy.
    ///
    /// Non-FCFS policies fall back to arrival order on ties; every
    /// policy finally falls back to submission order.
    pub fn rule_engine(self) -> RuleEngine {
        let engine = match self {
            QueuePolicy::Fcfs => RuleEngine::new().with_rule(rules::Fcfs),
            QueuePolicy::SmallestJobFirst => RuleEngine::new()
                .with_rule(rules::SmallestJob::default())
                .with_tie_breaker(rules::Fcfs),
            QueuePolicy::ShortestDurationFirst => RuleEngine::new()
                .with_rule(rules::ShortestDuration)
                .with_tie_breaker(rules::Fcfs),
        };
        engine.with_final_tie_breaker(TieBreaker::BySubmission)
    }
}

impl fmt::Display for QueuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueuePolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fcfs" | "fifo" | "first-come-first-served" => Ok(QueuePolicy::Fcfs),
            "sjf" | "smallest-job-first" => Ok(QueuePolicy::SmallestJobFirst),
            "sdf" | "shortest-duration-first" => Ok(QueuePolicy::ShortestDurationFirst),
            other => match other.parse::<i64>() {
                Ok(code) => QueuePolicy::from_code(code),
                Err(_) => Err(SimError::UnknownQueuePolicy(s.to_string())),
            },
        }
    }
}

impl TryFrom<PolicySelector> for QueuePolicy {
    type Error = SimError;

    fn try_from(selector: PolicySelector) -> Result<Self, Self::Error> {
        match selector {
            PolicySelector::Code(code) => QueuePolicy::from_code(code),
            PolicySelector::Name(name) => name.parse(),
        }
    }
}
