use std::future::Future;
use std::time::Duration;

/// Connection-level transport faults. Protocol-level rejections are reported
/// through [`SendStatus`], not through this error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("association rejected: {0}")]
    AssociationRejected(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// Protocol-level outcome of one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendStatus {
    pub status_code: u16,
    pub success: bool,
}

impl SendStatus {
    pub fn accepted(status_code: u16) -> Self {
        Self {
            status_code,
            success: true,
        }
    }

    pub fn rejected(status_code: u16) -> Self {
        Self {
            status_code,
            success: false,
        }
    }
}

/// Whether a transport opens a fresh association per send or keeps one per
/// worker. Consulted by transport implementations, not by the engine; the
/// engine never shares a transport-level handle between workers either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssociationPolicy {
    #[default]
    PerSend,
    PerWorker,
}

/// Blocking send / health-check capability supplied by the networking layer.
///
/// Implementations own all association handling. Both operations are invoked
/// from many workers concurrently.
pub trait Transport: Send + Sync + 'static {
    type Dataset: Send + 'static;

    /// One lightweight health check (e.g. an echo) with a hard timeout.
    fn health_check(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool, TransportError>> + Send;

    /// One blocking send of a single dataset.
    fn send(
        &self,
        dataset: Self::Dataset,
    ) -> impl Future<Output = Result<SendStatus, TransportError>> + Send;
}
