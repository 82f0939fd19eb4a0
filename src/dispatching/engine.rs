//! Rule engine for queue ordering.
//!
//! Applies rules in sequence: the next rule is consulted only when all
//! earlier rules tie. A final tie-breaker decides what is left.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{DispatchingRule, RuleScore};
use crate::models::Job;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Leave tied jobs in their current relative order (stable sort).
    #[default]
    Stable,
    /// Lower job id (earlier submission) first.
    BySubmission,
}

/// A composable rule engine for job ordering.
///
/// # Example
/// ```
/// use u_jobsim::dispatching::{RuleEngine, TieBreaker, rules};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::ShortestDuration)
///     .with_tie_breaker(rules::Fcfs)
///     .with_final_tie_breaker(TieBreaker::BySubmission);
/// assert_eq!(engine.rule_names(), vec!["SDF", "FCFS"]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a primary rule.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a rule consulted only when every earlier rule ties.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Compares two jobs (`Less` = `a` goes first).
    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        for rule in &self.rules {
            let ordering = rule.evaluate(a).cmp(&rule.evaluate(b));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        match self.tie_breaker {
            TieBreaker::Stable => Ordering::Equal,
            TieBreaker::BySubmission => a.id.cmp(&b.id),
        }
    }

    /// Sorts jobs in place, highest priority first.
    pub fn sort(&self, jobs: &mut [Job]) {
        jobs.sort_by(|a, b| self.compare(a, b));
    }

    /// Returns indices into `jobs`, highest priority first.
    pub fn sort_indices(&self, jobs: &[Job]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..jobs.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&jobs[a], &jobs[b]));
        indices
    }

    /// Returns the index of the highest-priority job.
    pub fn select_best(&self, jobs: &[Job]) -> Option<usize> {
        (0..jobs.len()).min_by(|&a, &b| self.compare(&jobs[a], &jobs[b]))
    }

    /// Scores from each rule for one job.
    pub fn evaluate(&self, job: &Job) -> Vec<RuleScore> {
        self.rules.iter().map(|r| r.evaluate(job)).collect()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
