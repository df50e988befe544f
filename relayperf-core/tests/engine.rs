use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use relayperf_core::{
    CyclicSupply, Error, LoadEngine, LoadOptions, MetricsCollector, SendStatus, Transport,
    TransportError,
};

/// Always-reachable transport with configurable latency and failure shape.
#[derive(Debug, Default)]
struct StubTransport {
    latency: Duration,
    fail_health_check: bool,
    /// Every nth send fails at the connection level.
    fail_every: Option<u64>,
    /// Every nth send is rejected at the protocol level.
    reject_every: Option<u64>,
    sends: AtomicU64,
}

impl Transport for StubTransport {
    type Dataset = u32;

    async fn health_check(&self, _timeout: Duration) -> Result<bool, TransportError> {
        if self.fail_health_check {
            Err(TransportError::Connect("connection refused".to_string()))
        } else {
            Ok(true)
        }
    }

    async fn send(&self, _dataset: u32) -> Result<SendStatus, TransportError> {
        let n = self.sends.fetch_add(1, Ordering::Relaxed) + 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(k) = self.fail_every {
            if n % k == 0 {
                return Err(TransportError::Connect("connection reset".to_string()));
            }
        }
        if let Some(k) = self.reject_every {
            if n % k == 0 {
                return Ok(SendStatus::rejected(0xA700));
            }
        }
        Ok(SendStatus::accepted(0x0000))
    }
}

fn supply() -> Arc<CyclicSupply<u32>> {
    Arc::new(CyclicSupply::new(vec![1, 2, 3]).unwrap_or_else(|e| panic!("{e}")))
}

#[tokio::test(start_paused = true)]
async fn paced_run_approximates_the_target_rate() -> anyhow::Result<()> {
    let engine = LoadEngine::new(StubTransport::default());
    let metrics = Arc::new(MetricsCollector::new());

    let total = engine
        .run_load(
            supply(),
            metrics.clone(),
            LoadOptions {
                duration: Duration::from_secs(10),
                concurrency: 4,
                rate_target: Some(20.0),
            },
        )
        .await?;

    // 10s at 20/s: accept >= 95% of 200 plus slight overshoot.
    assert!((190..=210).contains(&total), "total was {total}");
    assert_eq!(total, metrics.total());
    assert_eq!(metrics.failures(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unpaced_run_sends_substantially_more_than_paced() -> anyhow::Result<()> {
    let paced_metrics = Arc::new(MetricsCollector::new());
    let unpaced_metrics = Arc::new(MetricsCollector::new());

    let engine = LoadEngine::new(StubTransport {
        latency: Duration::from_millis(1),
        ..StubTransport::default()
    });

    let paced = engine
        .run_load(
            supply(),
            paced_metrics,
            LoadOptions {
                duration: Duration::from_secs(5),
                concurrency: 4,
                rate_target: Some(20.0),
            },
        )
        .await?;

    let engine = LoadEngine::new(StubTransport {
        latency: Duration::from_millis(1),
        ..StubTransport::default()
    });

    let unpaced = engine
        .run_load(
            supply(),
            unpaced_metrics,
            LoadOptions {
                duration: Duration::from_secs(5),
                concurrency: 4,
                rate_target: None,
            },
        )
        .await?;

    assert!(paced > 0);
    assert!(
        unpaced > paced * 10,
        "unpaced {unpaced} vs paced {paced}"
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn transport_failures_become_failed_samples() -> anyhow::Result<()> {
    let engine = LoadEngine::new(StubTransport {
        latency: Duration::from_millis(1),
        fail_every: Some(3),
        reject_every: Some(4),
        ..StubTransport::default()
    });
    let metrics = Arc::new(MetricsCollector::new());

    let total = engine
        .run_load(
            supply(),
            metrics.clone(),
            LoadOptions {
                duration: Duration::from_millis(200),
                concurrency: 2,
                rate_target: None,
            },
        )
        .await?;

    let snap = metrics.snapshot();
    assert_eq!(snap.total, total);
    assert_eq!(snap.total, snap.successes + snap.failures);
    assert!(snap.failures > 0, "expected injected failures to be recorded");
    assert!(snap.successes > 0);

    // Connection-level failures carry the error text; protocol rejections
    // carry the rejecting status code.
    let samples = metrics.samples();
    assert!(
        samples
            .iter()
            .any(|s| !s.is_success() && s.error() == Some("connection failed: connection reset"))
    );
    assert!(
        samples
            .iter()
            .any(|s| !s.is_success() && s.status_code() == Some(0xA700))
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn in_flight_send_completes_past_the_deadline() -> anyhow::Result<()> {
    let engine = LoadEngine::new(StubTransport {
        latency: Duration::from_millis(50),
        ..StubTransport::default()
    });
    let metrics = Arc::new(MetricsCollector::new());

    let total = engine
        .run_load(
            supply(),
            metrics.clone(),
            LoadOptions {
                duration: Duration::from_millis(10),
                concurrency: 1,
                rate_target: None,
            },
        )
        .await?;

    // The one send that was in flight when the deadline passed still records.
    assert_eq!(total, 1);
    assert_eq!(metrics.total(), 1);
    Ok(())
}

#[tokio::test]
async fn run_load_rejects_zero_concurrency() {
    let engine = LoadEngine::new(StubTransport::default());
    let result = engine
        .run_load(
            supply(),
            Arc::new(MetricsCollector::new()),
            LoadOptions {
                duration: Duration::from_secs(1),
                concurrency: 0,
                rate_target: None,
            },
        )
        .await;

    assert!(matches!(result, Err(Error::InvalidConcurrency)));
}

#[tokio::test]
async fn run_load_rejects_malformed_rate_targets() {
    let engine = LoadEngine::new(StubTransport::default());
    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let result = engine
            .run_load(
                supply(),
                Arc::new(MetricsCollector::new()),
                LoadOptions {
                    duration: Duration::from_secs(1),
                    concurrency: 2,
                    rate_target: Some(bad),
                },
            )
            .await;

        assert!(
            matches!(result, Err(Error::InvalidRateTarget(_))),
            "rate {bad} was accepted"
        );
    }
}

#[tokio::test]
async fn ping_returns_false_on_health_check_failure() {
    let engine = LoadEngine::new(StubTransport {
        fail_health_check: true,
        ..StubTransport::default()
    });
    assert!(!engine.ping(Duration::from_secs(2)).await);

    let engine = LoadEngine::new(StubTransport::default());
    assert!(engine.ping(Duration::from_secs(2)).await);
}

#[tokio::test]
async fn send_one_records_exactly_one_sample() {
    let engine = LoadEngine::new(StubTransport {
        fail_every: Some(2),
        ..StubTransport::default()
    });
    let metrics = MetricsCollector::new();

    assert!(engine.send_one(7, &metrics).await);
    assert!(!engine.send_one(7, &metrics).await);

    let snap = metrics.snapshot();
    assert_eq!(snap.total, 2);
    assert_eq!(snap.successes, 1);
    assert_eq!(snap.failures, 1);
}
