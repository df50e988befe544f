use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;

/// Shared token pool pacing the aggregate send rate across all workers.
///
/// A feeder task refills the pool at the target rate; every worker claims one
/// token per send. Because the pool is shared, a stalled worker's unclaimed
/// tokens are picked up by the others, so the aggregate rate self-corrects.
/// Backlog is bounded to `burst_capacity` tokens; refills beyond that are
/// discarded (token-bucket semantics).
#[derive(Debug)]
pub struct RatePacer {
    scheduled_total: AtomicU64,
    claimed_total: AtomicU64,
    burst_capacity: u64,
    done: AtomicBool,
    notify: Notify,
}

impl RatePacer {
    pub fn new(burst_capacity: u64) -> Self {
        Self {
            scheduled_total: AtomicU64::new(0),
            claimed_total: AtomicU64::new(0),
            burst_capacity: burst_capacity.max(1),
            done: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Stops the pacer. Workers drain any remaining backlog, then
    /// [`claim`](Self::claim) returns `false`.
    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Adds up to `tokens` new send permits, capped so the unclaimed backlog
    /// never exceeds `burst_capacity`.
    pub fn refill(&self, tokens: u64) {
        if tokens == 0 {
            return;
        }

        let claimed = self.claimed_total.load(Ordering::Relaxed);
        let scheduled = self.scheduled_total.load(Ordering::Relaxed);
        let backlog = scheduled.saturating_sub(claimed);

        let to_add = tokens.min(self.burst_capacity.saturating_sub(backlog));
        if to_add != 0 {
            self.scheduled_total.fetch_add(to_add, Ordering::Relaxed);
            self.notify.notify_waiters();
        }
    }

    /// Waits for a send permit. Returns `false` once the pacer is done and
    /// the backlog is drained.
    pub async fn claim(&self) -> bool {
        loop {
            if self.is_done() {
                let claimed = self.claimed_total.load(Ordering::Relaxed);
                let scheduled = self.scheduled_total.load(Ordering::Relaxed);
                if claimed >= scheduled {
                    return false;
                }
            }

            let claimed = self.claimed_total.load(Ordering::Relaxed);
            let scheduled = self.scheduled_total.load(Ordering::Relaxed);

            if claimed < scheduled {
                if self
                    .claimed_total
                    .compare_exchange_weak(
                        claimed,
                        claimed.saturating_add(1),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    )
                    .is_ok()
                {
                    return true;
                }
                continue;
            }

            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn claims_exactly_the_refilled_tokens() {
        let pacer = RatePacer::new(10);
        pacer.refill(3);
        assert!(pacer.claim().await);
        assert!(pacer.claim().await);
        assert!(pacer.claim().await);

        pacer.mark_done();
        assert!(!pacer.claim().await);
    }

    #[tokio::test]
    async fn refill_is_capped_at_burst_capacity() {
        let pacer = RatePacer::new(2);
        pacer.refill(100);
        pacer.mark_done();

        assert!(pacer.claim().await);
        assert!(pacer.claim().await);
        assert!(!pacer.claim().await);
    }

    #[tokio::test]
    async fn done_pacer_drains_backlog_before_stopping() {
        let pacer = RatePacer::new(5);
        pacer.refill(2);
        pacer.mark_done();

        assert!(pacer.claim().await);
        assert!(pacer.claim().await);
        assert!(!pacer.claim().await);
    }

    #[tokio::test]
    async fn blocked_claim_wakes_on_refill() {
        use std::sync::Arc;

        let pacer = Arc::new(RatePacer::new(4));
        let waiter = {
            let pacer = pacer.clone();
            tokio::spawn(async move { pacer.claim().await })
        };

        tokio::task::yield_now().await;
        pacer.refill(1);

        let claimed = waiter.await.unwrap_or(false);
        assert!(claimed);
    }
}
