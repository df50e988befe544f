//! Pass/fail evaluation of a run's metrics against configured thresholds.

use std::fmt;

use relayperf_core::MetricsSnapshot;

use crate::config::Thresholds;

/// Which p95 bound applies: sustained stability runs get the looser one,
/// short throughput bursts the tighter one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Sustained,
    Burst,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdViolation {
    pub metric: &'static str,
    pub limit: f64,
    pub observed: f64,
}

impl fmt::Display for ThresholdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: observed {:.3} exceeds limit {:.3}",
            self.metric, self.observed, self.limit
        )
    }
}

/// Checks a snapshot against the thresholds; an empty result means the run
/// passed. A snapshot without successful samples yields no p95 violation —
/// the error-rate check is what fails such a run.
pub fn evaluate(
    thresholds: &Thresholds,
    snapshot: &MetricsSnapshot,
    kind: RunKind,
) -> Vec<ThresholdViolation> {
    let mut violations = Vec::new();

    if snapshot.error_rate > thresholds.max_error_rate {
        violations.push(ThresholdViolation {
            metric: "error_rate",
            limit: thresholds.max_error_rate,
            observed: snapshot.error_rate,
        });
    }

    let p95_limit = match kind {
        RunKind::Sustained => thresholds.max_p95_latency_ms,
        RunKind::Burst => thresholds.max_p95_latency_ms_short,
    };
    if let Some(p95) = snapshot.p95_latency_ms {
        if p95 > p95_limit {
            violations.push(ThresholdViolation {
                metric: "p95_latency_ms",
                limit: p95_limit,
                observed: p95,
            });
        }
    }

    violations
}
