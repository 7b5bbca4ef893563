use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Handle returned by [`Listener::subscribe`]. Passing it back to
/// [`Listener::unsubscribe`] removes exactly that registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Registration<A: 'static> {
    id: SubscriptionId,
    callback: Callback<A>,
    once: bool,
}

/// Multi-subscriber, multi-fire synchronous notification channel.
///
/// `trigger` invokes every registration present at trigger time, in
/// registration order, on the caller's thread. It may fire any number
/// of times over the listener's lifetime; this is deliberately not a
/// one-shot future. There is no queuing and no backpressure.
///
/// Registering the same closure twice yields two independent
/// registrations, each fired separately.
///
/// A panicking callback is caught and logged so the remaining
/// callbacks in the same `trigger` call still run. Callbacks may
/// subscribe or unsubscribe during delivery; mutations take effect
/// from the next `trigger`.
pub struct Listener<A: 'static> {
    registrations: Mutex<Vec<Registration<A>>>,
    next_id: AtomicU64,
}

impl<A: 'static> Listener<A> {
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register `callback` for every future `trigger`.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.register(Arc::new(callback), false)
    }

    /// Register `callback` for the next `trigger` only; the
    /// registration is removed as part of that delivery.
    pub fn subscribe_once<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.register(Arc::new(callback), true)
    }

    fn register(&self, callback: Callback<A>, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations
            .lock()
            .unwrap()
            .push(Registration { id, callback, once });
        id
    }

    /// Remove exactly the registration behind `id`. Returns whether a
    /// registration was removed; removing twice is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registrations = self.registrations.lock().unwrap();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }

    /// Drop every registration at once.
    pub fn clear(&self) {
        self.registrations.lock().unwrap().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.registrations.lock().unwrap().len()
    }

    /// Synchronously invoke every currently registered callback, in
    /// registration order, with the same payload.
    pub fn trigger(&self, payload: &A) {
        // Snapshot under the lock, invoke outside it, so callbacks may
        // re-enter this listener without deadlocking.
        let batch: Vec<(SubscriptionId, Callback<A>)> = {
            let mut registrations = self.registrations.lock().unwrap();
            let batch = registrations
                .iter()
                .map(|registration| (registration.id, Arc::clone(&registration.callback)))
                .collect();
            registrations.retain(|registration| !registration.once);
            batch
        };

        for (id, callback) in batch {
            if catch_unwind(AssertUnwindSafe(|| callback(payload))).is_err() {
                log::error!(
                    "listener callback {:?} panicked; remaining subscribers still run",
                    id
                );
            }
        }
    }
}

impl<A: 'static> Default for Listener<A> {
    fn default() -> Self {
        Self::new()
    }
}
