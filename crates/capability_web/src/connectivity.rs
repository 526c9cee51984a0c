//! Observable adapter over online/offline connectivity.

use std::{cell::Cell, rc::Rc};

use capability_core::{
    AdapterState, CapabilityError, ConnectivityBackend, ConnectivityCallback, ObservableState,
    WatchHandle,
};

/// Stable capability name for connectivity diagnostics and probing.
pub const CONNECTIVITY_CAPABILITY: &str = "connectivity";

/// Status fields of the connectivity snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityStatus {
    /// Last observed online flag; `None` until the first read or transition.
    pub online: Option<bool>,
    /// Whether transitions are currently being watched.
    pub watching: bool,
}

/// Observable adapter for the platform's online flag.
///
/// `watch` registers for transitions and seeds the snapshot with the current
/// flag; calling it while already watching is a no-op. `unwatch` is an
/// idempotent teardown.
pub struct ConnectivityAdapter<B> {
    backend: B,
    state: ObservableState<ConnectivityStatus>,
    handle: Cell<Option<WatchHandle>>,
}

impl<B: ConnectivityBackend> ConnectivityAdapter<B> {
    /// Probes `backend` and builds the adapter with no observation yet.
    pub fn new(backend: B) -> Self {
        let supported = backend.supported();
        let state = ObservableState::new(
            supported,
            ConnectivityStatus {
                online: None,
                watching: false,
            },
        );
        Self {
            backend,
            state,
            handle: Cell::new(None),
        }
    }

    /// Returns the observable state for subscription and inspection.
    pub fn state(&self) -> &ObservableState<ConnectivityStatus> {
        &self.state
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Rc<AdapterState<ConnectivityStatus>> {
        self.state.get()
    }

    fn ensure_supported(&self) -> Result<(), CapabilityError> {
        if self.state.supported() {
            Ok(())
        } else {
            Err(self
                .state
                .record_failure(CapabilityError::unsupported(CONNECTIVITY_CAPABILITY)))
        }
    }

    fn native(&self, message: impl Into<String>) -> CapabilityError {
        self.state
            .record_failure(CapabilityError::native(CONNECTIVITY_CAPABILITY, message))
    }

    /// Reads the current online flag and records it in the snapshot.
    pub fn refresh(&self) -> Result<bool, CapabilityError> {
        self.ensure_supported()?;
        self.state.begin_attempt();

        let online = self
            .backend
            .is_online()
            .map_err(|message| self.native(message))?;
        self.state
            .update(|snapshot| snapshot.status.online = Some(online));
        Ok(online)
    }

    /// Starts watching connectivity transitions.
    ///
    /// The snapshot is seeded with the current flag. Calling `watch` while
    /// already watching does nothing.
    pub fn watch(&self) -> Result<(), CapabilityError> {
        self.ensure_supported()?;
        if self.handle.get().is_some() {
            return Ok(());
        }
        self.state.begin_attempt();

        let state = self.state.clone();
        let on_change: ConnectivityCallback = Rc::new(move |online| {
            state.update(|snapshot| snapshot.status.online = Some(online));
        });
        let online = self
            .backend
            .is_online()
            .map_err(|message| self.native(message))?;
        let handle = self
            .backend
            .watch(on_change)
            .map_err(|message| self.native(message))?;
        self.handle.set(Some(handle));
        self.state.update(|snapshot| {
            snapshot.status.online = Some(online);
            snapshot.status.watching = true;
        });
        Ok(())
    }

    /// Stops watching if a watch is active. Idempotent.
    ///
    /// On failure the watch handle is kept so `unwatch` can be retried; the
    /// snapshot keeps `watching` set until the listeners are actually gone.
    pub fn unwatch(&self) -> Result<(), CapabilityError> {
        let Some(handle) = self.handle.get() else {
            return Ok(());
        };
        self.backend
            .unwatch(handle)
            .map_err(|message| self.native(message))?;
        self.handle.set(None);
        self.state
            .update(|snapshot| snapshot.status.watching = false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use capability_core::{MemoryConnectivityBackend, NoopConnectivityBackend};

    use super::*;

    #[test]
    fn refresh_records_the_current_flag() {
        let backend = MemoryConnectivityBackend::new();
        let adapter = ConnectivityAdapter::new(backend.clone());
        assert_eq!(adapter.snapshot().status.online, None);

        assert!(adapter.refresh().expect("refresh"));
        assert_eq!(adapter.snapshot().status.online, Some(true));

        backend.set_online(false);
        assert!(!adapter.refresh().expect("refresh"));
        assert_eq!(adapter.snapshot().status.online, Some(false));
    }

    #[test]
    fn watch_seeds_and_follows_transitions() {
        let backend = MemoryConnectivityBackend::new();
        let adapter = ConnectivityAdapter::new(backend.clone());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = adapter
            .state()
            .subscribe(move |snapshot| sink.borrow_mut().push(snapshot.status.online));

        adapter.watch().expect("watch");
        backend.set_online(false);
        backend.set_online(true);

        assert_eq!(
            *seen.borrow(),
            vec![None, Some(true), Some(false), Some(true)]
        );
        assert!(adapter.snapshot().status.watching);
    }

    #[test]
    fn watch_is_a_no_op_while_watching() {
        let backend = MemoryConnectivityBackend::new();
        let adapter = ConnectivityAdapter::new(backend.clone());
        adapter.watch().expect("watch");
        adapter.watch().expect("watch again");
        assert_eq!(backend.watcher_count(), 1);
    }

    #[test]
    fn unwatch_stops_updates_and_is_idempotent() {
        let backend = MemoryConnectivityBackend::new();
        let adapter = ConnectivityAdapter::new(backend.clone());
        adapter.watch().expect("watch");

        adapter.unwatch().expect("unwatch");
        adapter.unwatch().expect("unwatch again");
        backend.set_online(false);

        let snapshot = adapter.snapshot();
        assert!(!snapshot.status.watching);
        assert_eq!(snapshot.status.online, Some(true));
        assert_eq!(backend.watcher_count(), 0);
    }

    struct FailingUnwatchBackend {
        inner: MemoryConnectivityBackend,
        unwatch_failures: Cell<u32>,
    }

    impl ConnectivityBackend for FailingUnwatchBackend {
        fn supported(&self) -> bool {
            self.inner.supported()
        }

        fn is_online(&self) -> Result<bool, String> {
            self.inner.is_online()
        }

        fn watch(&self, on_change: ConnectivityCallback) -> Result<WatchHandle, String> {
            self.inner.watch(on_change)
        }

        fn unwatch(&self, handle: WatchHandle) -> Result<(), String> {
            if self.unwatch_failures.get() > 0 {
                self.unwatch_failures.set(self.unwatch_failures.get() - 1);
                return Err("listener removal failed".to_string());
            }
            self.inner.unwatch(handle)
        }
    }

    #[test]
    fn failed_unwatch_keeps_the_handle_for_retry() {
        let inner = MemoryConnectivityBackend::new();
        let adapter = ConnectivityAdapter::new(FailingUnwatchBackend {
            inner: inner.clone(),
            unwatch_failures: Cell::new(1),
        });
        adapter.watch().expect("watch");

        let error = adapter.unwatch().expect_err("unwatch");
        assert!(matches!(error, CapabilityError::Native { .. }));
        assert!(adapter.snapshot().status.watching);
        assert_eq!(inner.watcher_count(), 1);

        adapter.unwatch().expect("retry unwatch");
        assert!(!adapter.snapshot().status.watching);
        assert_eq!(inner.watcher_count(), 0);
    }

    #[test]
    fn unsupported_backend_rejects_and_records() {
        let adapter = ConnectivityAdapter::new(NoopConnectivityBackend);
        let error = adapter.refresh().expect_err("refresh");
        assert_eq!(error, CapabilityError::unsupported(CONNECTIVITY_CAPABILITY));
        assert_eq!(adapter.snapshot().last_error, Some(error));
        adapter.unwatch().expect("unwatch is still a no-op");
    }
}
