use std::time::Duration;

use tokio::time::Instant;

/// Immutable record of one send attempt's outcome.
///
/// `error` is set if and only if the attempt failed; `status_code` may be
/// present on both success and protocol-level rejection.
#[derive(Debug, Clone)]
pub struct Sample {
    start: Instant,
    end: Instant,
    success: bool,
    status_code: Option<u16>,
    error: Option<String>,
}

impl Sample {
    pub fn success(start: Instant, end: Instant, status_code: Option<u16>) -> Self {
        Self {
            start,
            end: end.max(start),
            success: true,
            status_code,
            error: None,
        }
    }

    pub fn failure(
        start: Instant,
        end: Instant,
        status_code: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end: end.max(start),
            success: false,
            status_code,
            error: Some(error.into()),
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn latency(&self) -> Duration {
        self.end.duration_since(self.start)
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency().as_secs_f64() * 1000.0
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
