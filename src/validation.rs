//! Input validation for simulations.
//!
//! Checks job submissions, cluster shapes and workload generator
//! parameters before they reach the scheduler. Detects:
//! - Negative arrival times, requirements or durations
//! - Requirements too large to represent
//! - Empty pools and zero-capacity nodes
//! - Inverted generator ranges
//!
//! Every check runs; all problems are reported together.

use std::fmt;

use crate::models::{ClusterConfig, JobSpec};
use crate::workload::WorkloadConfig;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A field that must be non-negative is negative.
    NegativeValue,
    /// A field exceeds the representable range.
    OutOfRange,
    /// The pool has no nodes.
    EmptyCluster,
    /// Nodes have no cores or no memory.
    ZeroCapacity,
    /// A `min..=max` range has `min > max`.
    InvalidRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a job submission.
///
/// Checks:
/// 1. Arrival time and execution time are non-negative
/// 2. Cores and memory are non-negative and fit in `u32`
///
/// Requirements larger than any node are *not* rejected here: such a
/// job is legal and simply never leaves the queue.
pub fn validate_job(spec: &JobSpec) -> ValidationResult {
    let mut errors = Vec::new();

    for (field, value) in [
        ("arrival_time", spec.arrival_time),
        ("execution_time", spec.execution_time),
    ] {
        if value < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeValue,
                format!("{field} must be non-negative, got {value}"),
            ));
        }
    }

    for (field, value) in [("cores", spec.cores), ("memory", spec.memory)] {
        if value < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeValue,
                format!("{field} must be non-negative, got {value}"),
            ));
        } else if value > i64::from(u32::MAX) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("{field} exceeds {}, got {value}", u32::MAX),
            ));
        }
    }

    finish(errors)
}

/// Validates a cluster shape.
pub fn validate_cluster(cluster: &ClusterConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if cluster.node_count == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCluster,
            "cluster must have at least one node",
        ));
    }
    if cluster.node_cores == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroCapacity,
            "node_cores must be positive",
        ));
    }
    if cluster.node_memory == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroCapacity,
            "node_memory must be positive",
        ));
    }

    finish(errors)
}

/// Validates workload generator parameters.
pub fn validate_workload(workload: &WorkloadConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if workload.horizon == 0 && workload.job_count > 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRange,
            "horizon must be positive when jobs are generated",
        ));
    }

    for (field, range) in [
        ("cores", workload.cores),
        ("memory", workload.memory),
        ("duration", workload.duration),
    ] {
        if range.min < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeValue,
                format!("{field} range must be non-negative, got min {}", range.min),
            ));
        }
        if range.min > range.max {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRange,
                format!("{field} range is inverted: {}..={}", range.min, range.max),
            ));
        } else if field != "duration" && range.max > i64::from(u32::MAX) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("{field} range exceeds {}, got max {}", u32::MAX, range.max),
            ));
        }
    }

    finish(errors)
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::ValueRange;

    #[test]
    fn test_valid_job() {
        assert!(validate_job(&JobSpec::new(0, 4, 16, 2)).is_ok());
        assert!(validate_job(&JobSpec::new(0, 0, 0, 0)).is_ok());
    }

    #[test]
    fn test_negative_fields() {
        let errors = validate_job(&JobSpec::new(-1, -2, -3, -4)).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::NegativeValue));
    }

    #[test]
    fn test_oversized_requirement() {
        let errors = validate_job(&JobSpec::new(0, i64::from(u32::MAX) + 1, 1, 1)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::OutOfRange);
        assert!(errors[0].message.contains("cores"));
    }

    #[test]
    fn test_larger_than_node_is_accepted() {
        assert!(validate_job(&JobSpec::new(0, 1000, 1000, 1)).is_ok());
    }

    #[test]
    fn test_valid_cluster() {
        assert!(validate_cluster(&ClusterConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_cluster() {
        let errors = validate_cluster(&ClusterConfig::new(0, 24, 64)).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyCluster));
    }

    #[test]
    fn test_zero_capacity() {
        let errors = validate_cluster(&ClusterConfig::new(4, 0, 0)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::ZeroCapacity));
    }

    #[test]
    fn test_inverted_workload_range() {
        let workload = WorkloadConfig {
            duration: ValueRange::new(5, 1),
            ..WorkloadConfig::default()
        };
        let errors = validate_workload(&workload).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidRange);
        assert!(errors[0].message.contains("duration"));
    }

    #[test]
    fn test_negative_workload_range() {
        let workload = WorkloadConfig {
            cores: ValueRange::new(-2, 4),
            ..WorkloadConfig::default()
        };
        let errors = validate_workload(&workload).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::NegativeValue);
    }

    #[test]
    fn test_default_workload_is_valid() {
        assert!(validate_workload(&WorkloadConfig::default()).is_ok());
    }
}
