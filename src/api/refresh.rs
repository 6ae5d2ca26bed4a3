//! Single-flight token refresh.
//!
//! At most one refresh runs per client. The first request to see a 401
//! installs a shared future in the slot; every other request that fails while
//! it is pending clones and awaits the same future, so all of them observe
//! one outcome. The future empties the slot itself as soon as the refresh
//! completes, before any waiter is woken, so a later 401 starts a fresh
//! refresh instead of reusing a stale result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::error::RefreshError;

pub type RefreshResult = Result<String, RefreshError>;
pub type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

struct InFlight {
    id: u64,
    future: SharedRefresh,
}

#[derive(Clone, Default)]
pub struct RefreshSlot {
    inner: Arc<Mutex<Option<InFlight>>>,
    next_id: Arc<AtomicU64>,
}

impl RefreshSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the pending refresh, or start one with `start` if none is pending.
    ///
    /// The check and the install happen under one lock acquisition, and
    /// nothing is awaited while the lock is held.
    pub fn join_or_start<F>(&self, start: F) -> SharedRefresh
    where
        F: FnOnce() -> BoxFuture<'static, RefreshResult>,
    {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(in_flight) = slot.as_ref() {
            log::debug!("Joining in-flight token refresh #{}", in_flight.id);
            return in_flight.future.clone();
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let work = start();
        let future = async move {
            let result = work.await;
            let mut slot = inner.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.as_ref().is_some_and(|in_flight| in_flight.id == id) {
                *slot = None;
            }
            result
        }
        .boxed()
        .shared();

        log::debug!("Starting token refresh #{}", id);
        *slot = Some(InFlight {
            id,
            future: future.clone(),
        });
        future
    }

    /// Whether a refresh is currently in flight.
    pub fn is_pending(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
