use std::sync::Arc;

use tokio::time::Instant;

use crate::gate::DeadlineGate;
use crate::metrics::MetricsCollector;
use crate::pacer::RatePacer;
use crate::sample::Sample;
use crate::supply::DatasetSupply;
use crate::transport::Transport;

/// Performs one send and records exactly one sample, even when the transport
/// fails. Returns the recorded success flag.
pub(crate) async fn send_and_record<T: Transport>(
    transport: &T,
    dataset: T::Dataset,
    metrics: &MetricsCollector,
) -> bool {
    let start = Instant::now();
    let outcome = transport.send(dataset).await;
    let end = Instant::now();

    let sample = match outcome {
        Ok(status) if status.success => Sample::success(start, end, Some(status.status_code)),
        Ok(status) => Sample::failure(
            start,
            end,
            Some(status.status_code),
            format!("send rejected with status 0x{:04X}", status.status_code),
        ),
        Err(err) => {
            tracing::debug!(error = %err, "send failed");
            Sample::failure(start, end, None, err.to_string())
        }
    };

    let success = sample.is_success();
    metrics.record(sample);
    success
}

/// One concurrent sender: draws datasets from the shared supply, waits on the
/// shared pacer when rate-limited, and records one sample per attempt.
pub(crate) struct SendWorker<T, S> {
    pub(crate) worker_id: usize,
    pub(crate) transport: Arc<T>,
    pub(crate) supply: Arc<S>,
    pub(crate) metrics: Arc<MetricsCollector>,
    pub(crate) gate: Arc<DeadlineGate>,
    pub(crate) pacer: Option<Arc<RatePacer>>,
}

impl<T, S> SendWorker<T, S>
where
    T: Transport,
    S: DatasetSupply<Item = T::Dataset>,
{
    /// Runs until the deadline passes (or, when paced, the token pool is
    /// drained). Returns the number of sends this worker performed.
    pub(crate) async fn run(self) -> u64 {
        let mut sent: u64 = 0;

        loop {
            // Claim before checking the deadline: a token granted just
            // before the deadline must not turn into a send just after it.
            if let Some(pacer) = &self.pacer {
                if !pacer.claim().await {
                    break;
                }
            }

            if !self.gate.open() {
                break;
            }

            let dataset = self.supply.next();
            send_and_record(self.transport.as_ref(), dataset, &self.metrics).await;
            sent = sent.saturating_add(1);
        }

        tracing::trace!(worker_id = self.worker_id, sent, "worker stopped");
        sent
    }
}
