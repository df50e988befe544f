use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

/// Thread-safe source of opaque send payloads.
///
/// `next` must be safe to call concurrently from every worker; a supply is
/// allowed to hand the same underlying item to multiple workers at once.
pub trait DatasetSupply: Send + Sync {
    type Item: Send;

    fn next(&self) -> Self::Item;
}

/// Cyclic supply over a fixed backing set with a shared atomic cursor.
///
/// When the backing set is exhausted the cursor wraps around, so the same
/// item may be dispatched to multiple workers simultaneously. Per-item
/// uniqueness (e.g. freshly generated identifiers) is the supply's job, not
/// the backing data's; wrap a [`FnSupply`] around a generator when every
/// dispatched payload must be distinct.
#[derive(Debug)]
pub struct CyclicSupply<T> {
    items: Box<[T]>,
    cursor: AtomicUsize,
}

impl<T> CyclicSupply<T> {
    pub fn new(items: Vec<T>) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::EmptySupply);
        }
        Ok(Self {
            items: items.into_boxed_slice(),
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        // The constructor rejects empty backing sets.
        false
    }
}

impl<T: Clone + Send + Sync> DatasetSupply for CyclicSupply<T> {
    type Item = T;

    fn next(&self) -> T {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.items.len();
        self.items[idx].clone()
    }
}

/// Supply that produces each payload by calling a generator function.
///
/// Used when every send needs a fresh payload, e.g. re-identified variants of
/// a small backing set.
pub struct FnSupply<F>(F);

impl<F> FnSupply<F> {
    pub fn new(generate: F) -> Self {
        Self(generate)
    }
}

impl<T, F> DatasetSupply for FnSupply<F>
where
    T: Send,
    F: Fn() -> T + Send + Sync,
{
    type Item = T;

    fn next(&self) -> T {
        (self.0)()
    }
}
