pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("`concurrency` must be a positive integer")]
    InvalidConcurrency,

    #[error("rate target must be a positive, finite number (got {0})")]
    InvalidRateTarget(f64),

    #[error("dataset supply must hold at least one item")]
    EmptySupply,

    #[error(
        "verification timed out: `{identifier}` not found after {elapsed_seconds:.1}s ({attempts} attempts)"
    )]
    VerificationTimeout {
        identifier: String,
        elapsed_seconds: f64,
        attempts: u32,
    },

    #[error("verification lookup target could not be resolved: {0}")]
    LookupResolution(String),
}
