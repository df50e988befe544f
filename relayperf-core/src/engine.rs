use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{Error, Result};
use crate::gate::DeadlineGate;
use crate::metrics::MetricsCollector;
use crate::pacer::RatePacer;
use crate::supply::DatasetSupply;
use crate::transport::Transport;
use crate::worker::{SendWorker, send_and_record};

/// Run shape for one bounded load test.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub duration: Duration,
    pub concurrency: usize,
    /// Target aggregate send rate in images/sec; `None` means unpaced.
    pub rate_target: Option<f64>,
}

/// Drives N concurrent send workers against a target throughput for a
/// bounded wall-clock duration.
///
/// Per-send failures never escape a run; they become failed samples in the
/// shared [`MetricsCollector`]. Only programming errors (bad options) and
/// task-join failures are returned as errors.
pub struct LoadEngine<T> {
    transport: Arc<T>,
}

impl<T: Transport> LoadEngine<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_arc(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// One lightweight health check. Returns `false` on any failure —
    /// refused connection, rejected identity, timeout — and never errors.
    pub async fn ping(&self, timeout: Duration) -> bool {
        match self.transport.health_check(timeout).await {
            Ok(alive) => alive,
            Err(err) => {
                tracing::warn!(error = %err, "health check failed");
                false
            }
        }
    }

    /// Performs exactly one send on the calling task and records one sample.
    /// Returns the recorded success flag.
    pub async fn send_one(&self, dataset: T::Dataset, metrics: &MetricsCollector) -> bool {
        send_and_record(self.transport.as_ref(), dataset, metrics).await
    }

    /// Spawns `options.concurrency` workers sharing `metrics`, the pacer and
    /// the deadline; blocks until the deadline has passed and in-flight sends
    /// have drained. Returns the number of sends this call contributed
    /// (equal to `metrics.total()` when the collector started empty).
    pub async fn run_load<S>(
        &self,
        supply: Arc<S>,
        metrics: Arc<MetricsCollector>,
        options: LoadOptions,
    ) -> Result<u64>
    where
        S: DatasetSupply<Item = T::Dataset> + 'static,
    {
        if options.concurrency == 0 {
            return Err(Error::InvalidConcurrency);
        }
        if let Some(rate) = options.rate_target {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(Error::InvalidRateTarget(rate));
            }
        }

        let gate = Arc::new(DeadlineGate::new(options.duration));
        let pacer = options
            .rate_target
            .map(|rate| Arc::new(RatePacer::new((rate.ceil() as u64).max(1))));

        let started = Instant::now();
        gate.start_at(started);

        tracing::info!(
            concurrency = options.concurrency,
            duration_secs = options.duration.as_secs_f64(),
            rate_target = options.rate_target,
            "starting load run"
        );

        let mut handles = Vec::with_capacity(options.concurrency);
        for worker_id in 0..options.concurrency {
            let worker = SendWorker {
                worker_id,
                transport: self.transport.clone(),
                supply: supply.clone(),
                metrics: metrics.clone(),
                gate: gate.clone(),
                pacer: pacer.clone(),
            };
            handles.push(tokio::spawn(worker.run()));
        }

        // Feed the shared pacer on a fixed tick, carrying the fractional
        // remainder across ticks so non-integral rates stay accurate.
        let feeder = match (pacer, options.rate_target) {
            (Some(pacer), Some(rate)) => {
                let duration = options.duration;
                Some(tokio::spawn(async move {
                    let tick = Duration::from_millis(10);
                    let mut interval = tokio::time::interval(tick);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

                    // Start with one whole token so a short run still sends
                    // at least once.
                    let mut carry = 1.0f64;
                    loop {
                        interval.tick().await;

                        let elapsed = started.elapsed();
                        if elapsed >= duration {
                            break;
                        }

                        carry += rate * tick.as_secs_f64();
                        let due = carry.floor() as u64;
                        carry -= due as f64;

                        pacer.refill(due);
                    }

                    pacer.mark_done();
                }))
            }
            _ => None,
        };

        let mut total: u64 = 0;
        for handle in handles {
            total = total.saturating_add(handle.await?);
        }

        if let Some(feeder) = feeder {
            feeder.await?;
        }

        tracing::info!(total, elapsed_secs = started.elapsed().as_secs_f64(), "load run complete");
        Ok(total)
    }
}
