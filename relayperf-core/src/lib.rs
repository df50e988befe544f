mod engine;
mod error;
mod gate;
mod lookup;
mod metrics;
mod pacer;
mod poller;
mod sample;
mod supply;
mod transport;
mod worker;

pub use engine::{LoadEngine, LoadOptions};
pub use error::{Error, Result};
pub use gate::DeadlineGate;
pub use lookup::{AttributeMap, Lookup, LookupError};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use pacer::RatePacer;
pub use poller::{PollSettings, VerificationPoller};
pub use sample::Sample;
pub use supply::{CyclicSupply, DatasetSupply, FnSupply};
pub use transport::{AssociationPolicy, SendStatus, Transport, TransportError};
