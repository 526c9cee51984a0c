//! Snapshot state and the listener registry behind every adapter.
//!
//! An adapter owns one [`ObservableState`]. The current [`AdapterState`] is
//! held behind an `Rc` and replaced wholesale on every mutation, so each
//! notification delivers a stable reference. Subscribers are invoked
//! synchronously, in registration order, and a new subscriber is replayed the
//! current snapshot exactly once before `subscribe` returns.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::error::CapabilityError;

/// An adapter's view of its capability at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterState<S> {
    /// Result of the capability probe; set at construction, never mutated.
    pub supported: bool,
    /// Capability-specific status fields.
    pub status: S,
    /// Most recent failure; cleared at the start of each operation attempt.
    /// Aborts are never recorded here.
    pub last_error: Option<CapabilityError>,
}

type SnapshotCallback<S> = Rc<dyn Fn(&Rc<AdapterState<S>>)>;

struct Subscriber<S> {
    id: u64,
    callback: SnapshotCallback<S>,
}

struct StateCell<S> {
    current: Rc<AdapterState<S>>,
    subscribers: Vec<Subscriber<S>>,
    next_subscriber_id: u64,
}

/// Shared, observable adapter state: snapshot plus listener registry.
pub struct ObservableState<S> {
    inner: Rc<RefCell<StateCell<S>>>,
}

impl<S> Clone for ObservableState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Clone> ObservableState<S> {
    /// Creates observable state with the probe result and rest-state status.
    pub fn new(supported: bool, status: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StateCell {
                current: Rc::new(AdapterState {
                    supported,
                    status,
                    last_error: None,
                }),
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            })),
        }
    }

    /// Returns the current snapshot.
    pub fn get(&self) -> Rc<AdapterState<S>> {
        Rc::clone(&self.inner.borrow().current)
    }

    /// Returns the capability probe result captured at construction.
    pub fn supported(&self) -> bool {
        self.inner.borrow().current.supported
    }

    /// Registers `callback` and replays the current snapshot to it exactly
    /// once before returning.
    ///
    /// The returned [`Subscription`] removes the callback when
    /// [`Subscription::unsubscribe`] is called; other subscribers are
    /// unaffected.
    pub fn subscribe(
        &self,
        callback: impl Fn(&Rc<AdapterState<S>>) + 'static,
    ) -> Subscription<S> {
        let callback: SnapshotCallback<S> = Rc::new(callback);
        let (id, current) = {
            let mut cell = self.inner.borrow_mut();
            let id = cell.next_subscriber_id;
            cell.next_subscriber_id += 1;
            cell.subscribers.push(Subscriber {
                id,
                callback: Rc::clone(&callback),
            });
            (id, Rc::clone(&cell.current))
        };
        callback(&current);
        Subscription {
            cell: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Replaces the snapshot with a modified copy and notifies subscribers.
    ///
    /// Each callback observes the snapshot that is current at the moment it
    /// runs, so when a callback updates the state reentrantly, later
    /// callbacks in the same delivery see the newer snapshot rather than a
    /// stale one.
    pub fn update(&self, apply: impl FnOnce(&mut AdapterState<S>)) {
        {
            let mut cell = self.inner.borrow_mut();
            let mut next = (*cell.current).clone();
            apply(&mut next);
            cell.current = Rc::new(next);
        }
        self.notify();
    }

    /// Clears `last_error` at the start of an operation attempt.
    ///
    /// Notifies only when a previous failure was actually cleared.
    pub fn begin_attempt(&self) {
        if self.inner.borrow().current.last_error.is_none() {
            return;
        }
        self.update(|state| state.last_error = None);
    }

    /// Records `error` in the snapshot and returns it for propagation.
    ///
    /// Aborts pass through without touching the snapshot: cancellation is an
    /// expected outcome, not a user-visible failure.
    pub fn record_failure(&self, error: CapabilityError) -> CapabilityError {
        if !error.is_aborted() {
            let recorded = error.clone();
            self.update(|state| state.last_error = Some(recorded));
        }
        error
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        // The subscriber list is cloned out of the borrow so callbacks can
        // subscribe or unsubscribe reentrantly; each callback is re-checked
        // for membership so an unsubscribe during delivery takes effect for
        // the in-flight notification too. The snapshot is re-read per
        // callback so a reentrant update cannot leave a stale snapshot as
        // the final delivery.
        let subscribers: Vec<(u64, SnapshotCallback<S>)> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|subscriber| (subscriber.id, Rc::clone(&subscriber.callback)))
            .collect();
        for (id, callback) in subscribers {
            let snapshot = {
                let cell = self.inner.borrow();
                if !cell
                    .subscribers
                    .iter()
                    .any(|subscriber| subscriber.id == id)
                {
                    continue;
                }
                Rc::clone(&cell.current)
            };
            callback(&snapshot);
        }
    }
}

/// Disposer handle for one registered subscriber.
///
/// Disposal is explicit: dropping the handle without calling
/// [`Subscription::unsubscribe`] leaves the callback registered.
pub struct Subscription<S> {
    cell: Weak<RefCell<StateCell<S>>>,
    id: u64,
}

impl<S> Subscription<S> {
    /// Removes the subscriber this handle was returned for.
    pub fn unsubscribe(self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.borrow_mut()
                .subscribers
                .retain(|subscriber| subscriber.id != self.id);
        }
    }
}
