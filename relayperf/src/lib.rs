pub mod config;
pub mod summary;
pub mod thresholds;

pub use relayperf_core::{
    AssociationPolicy, AttributeMap, CyclicSupply, DatasetSupply, DeadlineGate, Error, FnSupply,
    LoadEngine, LoadOptions, Lookup, LookupError, MetricsCollector, MetricsSnapshot, PollSettings,
    RatePacer, Result, Sample, SendStatus, Transport, TransportError, VerificationPoller,
};
