//! Human-readable rendering of a run's metrics.

use std::fmt::Write as _;

use relayperf_core::MetricsSnapshot;

fn format_latency(ms: Option<f64>) -> String {
    match ms {
        Some(ms) if ms >= 1000.0 => format!("{:.2}s", ms / 1000.0),
        Some(ms) => format!("{ms:.1}ms"),
        None => "n/a".to_string(),
    }
}

pub fn render(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();

    out.push_str("summary\n");
    writeln!(
        &mut out,
        "  sends: {} (failed {})",
        snapshot.total, snapshot.failures
    )
    .ok();
    writeln!(&mut out, "  error_rate: {:.2}%", snapshot.error_rate * 100.0).ok();
    writeln!(
        &mut out,
        "  latency = avg={} p95={}",
        format_latency(snapshot.avg_latency_ms),
        format_latency(snapshot.p95_latency_ms)
    )
    .ok();
    writeln!(
        &mut out,
        "  throughput: {:.2}/s",
        snapshot.throughput_per_second
    )
    .ok();

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_fields() {
        let snap = MetricsSnapshot {
            total: 300,
            successes: 294,
            failures: 6,
            error_rate: 0.02,
            avg_latency_ms: Some(142.5),
            p95_latency_ms: Some(1250.0),
            throughput_per_second: 48.7,
        };

        let rendered = render(&snap);
        assert!(rendered.contains("sends: 300 (failed 6)"));
        assert!(rendered.contains("error_rate: 2.00%"));
        assert!(rendered.contains("avg=142.5ms"));
        assert!(rendered.contains("p95=1.25s"));
        assert!(rendered.contains("throughput: 48.70/s"));
    }

    #[test]
    fn empty_run_renders_na_latency() {
        let snap = MetricsSnapshot {
            total: 0,
            successes: 0,
            failures: 0,
            error_rate: 0.0,
            avg_latency_ms: None,
            p95_latency_ms: None,
            throughput_per_second: 0.0,
        };

        let rendered = render(&snap);
        assert!(rendered.contains("latency = avg=n/a p95=n/a"));
    }
}
