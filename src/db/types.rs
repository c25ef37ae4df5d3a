//! Adapter result types
//!
//! Plain records returned by adapter operations. None of these are
//! persisted; they exist to be logged, rendered, or inspected by callers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Outcome of a configuration check
///
/// Findings fall into three severity buckets. Only `errors` affect
/// validity: `is_valid()` is true exactly when there are no errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    recommendations: Vec<String>,
}

impl ValidationResult {
    /// An empty (valid) result
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// Record a hard failure
    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
        self.valid = false;
    }

    /// Record a soft finding that doesn't invalidate the config
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Record an optional tip
    pub fn recommend(&mut self, msg: impl Into<String>) {
        self.recommendations.push(msg.into());
    }

    /// Fold another result's findings into this one
    pub fn merge(&mut self, other: ValidationResult) {
        for e in other.errors {
            self.error(e);
        }
        self.warnings.extend(other.warnings);
        self.recommendations.extend(other.recommendations);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a liveness probe
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    /// Round-trip time of the probe query
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn healthy(latency: Duration) -> Self {
        Self {
            healthy: true,
            latency,
            error: None,
            checked_at: Utc::now(),
        }
    }

    pub fn unhealthy(latency: Duration, error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            latency,
            error: Some(error.into()),
            checked_at: Utc::now(),
        }
    }
}

/// Result of enabling provider extensions
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationResult {
    pub success: bool,
    /// Labels of statements that ran successfully
    pub applied: Vec<String>,
    /// One entry per skipped statement
    pub warnings: Vec<String>,
    /// Set only when the operation could not run at all
    pub error: Option<String>,
}

/// Result of applying provider tuning
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizationResult {
    pub success: bool,
    pub applied: Vec<String>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

/// Basic server statistics for status reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub version: Option<String>,
    pub database_size: Option<String>,
    pub active_connections: Option<u64>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
