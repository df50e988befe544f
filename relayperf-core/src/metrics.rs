use std::sync::{Mutex, MutexGuard};

use tokio::time::Instant;

use crate::sample::Sample;

/// Thread-safe aggregator of send [`Sample`]s for a single load-test run.
///
/// Samples are appended in completion order. The collector is append-only;
/// callers discard it and create a fresh one between independent runs.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    samples: Vec<Sample>,
    successes: u64,
    failures: u64,
    first_start: Option<Instant>,
    last_end: Option<Instant>,
}

/// Consistent point-in-time view of the derived statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub total: u64,
    pub successes: u64,
    pub failures: u64,
    /// `failures / total`, 0 when no samples have been recorded.
    pub error_rate: f64,
    /// Mean latency over successful samples only.
    pub avg_latency_ms: Option<f64>,
    /// Nearest-rank p95 over successful samples' latencies.
    pub p95_latency_ms: Option<f64>,
    /// `successes / (last_end - first_start)`, 0 with fewer than 2 samples.
    pub throughput_per_second: f64,
}

impl Inner {
    fn snapshot(&self) -> MetricsSnapshot {
        let total = self.samples.len() as u64;

        let error_rate = if total == 0 {
            0.0
        } else {
            self.failures as f64 / total as f64
        };

        let mut latencies: Vec<f64> = self
            .samples
            .iter()
            .filter(|s| s.is_success())
            .map(Sample::latency_ms)
            .collect();
        latencies.sort_by(|a, b| a.total_cmp(b));

        let (avg_latency_ms, p95_latency_ms) = if latencies.is_empty() {
            (None, None)
        } else {
            let n = latencies.len();
            let avg = latencies.iter().sum::<f64>() / n as f64;
            // Nearest-rank: sort ascending, index = ceil(0.95 * n) - 1.
            let rank = (0.95 * n as f64).ceil() as usize;
            let p95 = latencies[rank.saturating_sub(1).min(n - 1)];
            (Some(avg), Some(p95))
        };

        let throughput_per_second = match (self.first_start, self.last_end) {
            (Some(first), Some(last)) if total >= 2 => {
                let elapsed = last.saturating_duration_since(first).as_secs_f64();
                if elapsed > 0.0 {
                    self.successes as f64 / elapsed
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        MetricsSnapshot {
            total,
            successes: self.successes,
            failures: self.failures,
            error_rate,
            avg_latency_ms,
            p95_latency_ms,
            throughput_per_second,
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends one sample. O(1) amortized; never loses samples under
    /// concurrent calls.
    pub fn record(&self, sample: Sample) {
        let mut inner = self.lock();

        if sample.is_success() {
            inner.successes = inner.successes.saturating_add(1);
        } else {
            inner.failures = inner.failures.saturating_add(1);
        }

        inner.first_start = Some(match inner.first_start {
            Some(first) => first.min(sample.start()),
            None => sample.start(),
        });
        inner.last_end = Some(match inner.last_end {
            Some(last) => last.max(sample.end()),
            None => sample.end(),
        });

        inner.samples.push(sample);
    }

    /// Computes all derived statistics under a single lock acquisition, so a
    /// reader never observes a count without its sample.
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().snapshot()
    }

    pub fn total(&self) -> u64 {
        self.lock().samples.len() as u64
    }

    pub fn successes(&self) -> u64 {
        self.lock().successes
    }

    pub fn failures(&self) -> u64 {
        self.lock().failures
    }

    pub fn error_rate(&self) -> f64 {
        self.snapshot().error_rate
    }

    pub fn avg_latency_ms(&self) -> Option<f64> {
        self.snapshot().avg_latency_ms
    }

    pub fn p95_latency_ms(&self) -> Option<f64> {
        self.snapshot().p95_latency_ms
    }

    pub fn throughput_per_second(&self) -> f64 {
        self.snapshot().throughput_per_second
    }

    /// Copy of the recorded samples, in completion order.
    pub fn samples(&self) -> Vec<Sample> {
        self.lock().samples.clone()
    }
}
