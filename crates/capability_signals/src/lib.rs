#![warn(missing_docs, rustdoc::broken_intra_doc_links)]
//! Leptos bindings for observable capability state.
//!
//! Adapters expose their state through `ObservableState`; these helpers
//! mirror that state into the reactive system so components re-render on
//! every snapshot change, and route recorded failures into the console.

use std::rc::Rc;

use capability_core::{AdapterState, ObservableState, Subscription};
use leptos::*;

/// Mirrors `state` into a read signal holding the current snapshot.
///
/// The signal starts at the current snapshot and follows every later one.
/// The returned [`Subscription`] keeps the mirror alive; unsubscribe it when
/// the consuming component is done with the signal.
pub fn state_signal<S: Clone + 'static>(
    state: &ObservableState<S>,
) -> (ReadSignal<Rc<AdapterState<S>>>, Subscription<S>) {
    let (signal, set_signal) = create_signal(state.get());
    let subscription = state.subscribe(move |snapshot| set_signal.set(Rc::clone(snapshot)));
    (signal, subscription)
}

/// Logs every failure recorded in `state` as a console warning.
///
/// A failure already present in the snapshot is logged once at registration.
/// Aborted operations never reach the snapshot, so they are never logged.
pub fn log_failures<S: Clone + 'static>(
    capability: &'static str,
    state: &ObservableState<S>,
) -> Subscription<S> {
    state.subscribe(move |snapshot| {
        if let Some(error) = &snapshot.last_error {
            logging::warn!("{capability} capability failure: {error}");
        }
    })
}

#[cfg(test)]
mod tests {
    use capability_core::CapabilityError;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct CounterStatus {
        count: u32,
    }

    #[test]
    fn signal_follows_snapshots_until_unsubscribed() {
        let runtime = create_runtime();
        let state = ObservableState::new(true, CounterStatus::default());
        let (signal, subscription) = state_signal(&state);

        assert_eq!(signal.get_untracked().status.count, 0);
        state.update(|s| s.status.count = 7);
        assert_eq!(signal.get_untracked().status.count, 7);

        subscription.unsubscribe();
        state.update(|s| s.status.count = 9);
        assert_eq!(signal.get_untracked().status.count, 7);
        runtime.dispose();
    }

    #[test]
    fn failure_logging_registers_and_unregisters() {
        let state = ObservableState::new(true, CounterStatus::default());
        let subscription = log_failures("example", &state);
        assert_eq!(state.subscriber_count(), 1);

        state.record_failure(CapabilityError::native("example", "boom"));
        subscription.unsubscribe();
        assert_eq!(state.subscriber_count(), 0);
    }
}
