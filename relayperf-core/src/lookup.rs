use std::collections::BTreeMap;
use std::future::Future;

/// Attribute set returned for a matched object.
pub type AttributeMap = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Configuration-class failure (e.g. the query target's address cannot
    /// be resolved). The poller raises this immediately; retrying cannot fix
    /// it.
    #[error("lookup target could not be resolved: {0}")]
    Resolution(String),

    /// Transient query failure. The poller logs it and treats the attempt as
    /// "no match yet".
    #[error("lookup query failed: {0}")]
    Query(String),
}

/// Query capability against the target system, supplied by an external
/// networking layer (e.g. a protocol-level find operation).
pub trait Lookup: Send + Sync {
    /// Looks up an object by its identifier. `secondary` is an optional
    /// correlated key (e.g. a patient-style identifier) used only as a
    /// fallback query refinement.
    fn find_by_identifier(
        &self,
        identifier: &str,
        secondary: Option<&str>,
    ) -> impl Future<Output = Result<Option<AttributeMap>, LookupError>> + Send;
}
