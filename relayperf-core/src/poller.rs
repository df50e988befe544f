use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::lookup::{AttributeMap, Lookup, LookupError};

/// Timing parameters for arrival verification.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
enum PollState {
    Polling,
    Found(AttributeMap),
    TimedOut,
}

/// Confirms eventual arrival of a sent object by repeatedly querying an
/// external lookup collaborator.
///
/// An absent collaborator means verification is administratively disabled:
/// [`verify`](Self::verify) returns `Ok(None)` immediately without issuing a
/// query. Otherwise the poller runs a Polling/Found/TimedOut state machine
/// with a hard wall-clock timeout enforced here, not by the lookup.
pub struct VerificationPoller<L> {
    lookup: Option<Arc<L>>,
    settings: PollSettings,
}

impl<L: Lookup> VerificationPoller<L> {
    pub fn new(lookup: Option<Arc<L>>, settings: PollSettings) -> Self {
        Self { lookup, settings }
    }

    pub fn is_enabled(&self) -> bool {
        self.lookup.is_some()
    }

    /// Polls until `identifier` is found or the timeout elapses.
    ///
    /// Returns the match's attribute set, or `Ok(None)` when verification is
    /// disabled. A resolution-class lookup failure is returned immediately
    /// without consuming the timeout budget; transient query failures are
    /// logged and retried as "no match yet".
    pub async fn verify(
        &self,
        identifier: &str,
        secondary: Option<&str>,
    ) -> Result<Option<AttributeMap>> {
        let Some(lookup) = &self.lookup else {
            tracing::debug!(identifier, "verification disabled, skipping");
            return Ok(None);
        };

        let started = Instant::now();
        let mut attempts: u32 = 0;
        let mut state = PollState::Polling;

        loop {
            state = match state {
                PollState::Found(attributes) => {
                    tracing::info!(
                        identifier,
                        attempts,
                        elapsed_secs = started.elapsed().as_secs_f64(),
                        "object found"
                    );
                    return Ok(Some(attributes));
                }
                PollState::TimedOut => {
                    return Err(Error::VerificationTimeout {
                        identifier: identifier.to_string(),
                        elapsed_seconds: started.elapsed().as_secs_f64(),
                        attempts,
                    });
                }
                PollState::Polling => {
                    if started.elapsed() >= self.settings.timeout {
                        PollState::TimedOut
                    } else {
                        attempts = attempts.saturating_add(1);
                        tracing::debug!(
                            identifier,
                            attempt = attempts,
                            "sending verification query"
                        );

                        match lookup.find_by_identifier(identifier, secondary).await {
                            Ok(Some(attributes)) => PollState::Found(attributes),
                            Ok(None) => self.wait_for_next_attempt(started).await,
                            Err(LookupError::Resolution(reason)) => {
                                return Err(Error::LookupResolution(reason));
                            }
                            Err(err @ LookupError::Query(_)) => {
                                tracing::warn!(
                                    identifier,
                                    error = %err,
                                    "lookup query failed, retrying"
                                );
                                self.wait_for_next_attempt(started).await
                            }
                        }
                    }
                }
            };
        }
    }

    /// Sleeps `min(poll_interval, timeout - elapsed)` before the next poll.
    async fn wait_for_next_attempt(&self, started: Instant) -> PollState {
        let remaining = self
            .settings
            .timeout
            .saturating_sub(started.elapsed());
        if !remaining.is_zero() {
            tokio::time::sleep(self.settings.poll_interval.min(remaining)).await;
        }
        PollState::Polling
    }
}
