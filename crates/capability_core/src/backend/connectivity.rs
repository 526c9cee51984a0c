//! Online/offline connectivity backend contract.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

/// Callback invoked with the new online flag whenever connectivity changes.
pub type ConnectivityCallback = Rc<dyn Fn(bool)>;

/// Handle identifying one registered connectivity watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(u64);

impl WatchHandle {
    /// Wraps a backend-assigned watcher id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the backend-assigned watcher id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Connectivity backend reporting and watching the online flag.
pub trait ConnectivityBackend {
    /// Returns whether connectivity reporting is present in this environment.
    fn supported(&self) -> bool;

    /// Reads the current online flag.
    fn is_online(&self) -> Result<bool, String>;

    /// Registers `on_change` to run on every connectivity transition.
    fn watch(&self, on_change: ConnectivityCallback) -> Result<WatchHandle, String>;

    /// Removes a watcher. Unwatching an unknown handle is a no-op.
    fn unwatch(&self, handle: WatchHandle) -> Result<(), String>;
}

/// Backend for environments without connectivity reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConnectivityBackend;

impl ConnectivityBackend for NoopConnectivityBackend {
    fn supported(&self) -> bool {
        false
    }

    fn is_online(&self) -> Result<bool, String> {
        Ok(false)
    }

    fn watch(&self, _on_change: ConnectivityCallback) -> Result<WatchHandle, String> {
        Ok(WatchHandle::new(0))
    }

    fn unwatch(&self, _handle: WatchHandle) -> Result<(), String> {
        Ok(())
    }
}

/// In-memory connectivity backend driven by [`MemoryConnectivityBackend::set_online`].
#[derive(Clone)]
pub struct MemoryConnectivityBackend {
    online: Rc<Cell<bool>>,
    next_id: Rc<Cell<u64>>,
    watchers: Rc<RefCell<BTreeMap<u64, ConnectivityCallback>>>,
}

impl Default for MemoryConnectivityBackend {
    fn default() -> Self {
        Self {
            online: Rc::new(Cell::new(true)),
            next_id: Rc::new(Cell::new(0)),
            watchers: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }
}

impl MemoryConnectivityBackend {
    /// Creates a backend that starts online with no watchers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the online flag, notifying watchers when it actually changes.
    pub fn set_online(&self, online: bool) {
        if self.online.replace(online) == online {
            return;
        }
        let callbacks: Vec<ConnectivityCallback> =
            self.watchers.borrow().values().map(Rc::clone).collect();
        for callback in callbacks {
            callback(online);
        }
    }

    /// Returns the number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }
}

impl ConnectivityBackend for MemoryConnectivityBackend {
    fn supported(&self) -> bool {
        true
    }

    fn is_online(&self) -> Result<bool, String> {
        Ok(self.online.get())
    }

    fn watch(&self, on_change: ConnectivityCallback) -> Result<WatchHandle, String> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.watchers.borrow_mut().insert(id, on_change);
        Ok(WatchHandle::new(id))
    }

    fn unwatch(&self, handle: WatchHandle) -> Result<(), String> {
        self.watchers.borrow_mut().remove(&handle.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchers_see_transitions_only() {
        let backend = MemoryConnectivityBackend::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        backend
            .watch(Rc::new(move |online| sink.borrow_mut().push(online)))
            .expect("watch");

        backend.set_online(true); // already online, no transition
        backend.set_online(false);
        backend.set_online(true);

        assert_eq!(*seen.borrow(), vec![false, true]);
        assert!(backend.is_online().expect("is_online"));
    }

    #[test]
    fn unwatch_stops_notifications() {
        let backend = MemoryConnectivityBackend::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handle = backend
            .watch(Rc::new(move |online| sink.borrow_mut().push(online)))
            .expect("watch");

        backend.set_online(false);
        backend.unwatch(handle).expect("unwatch");
        backend.set_online(true);

        assert_eq!(*seen.borrow(), vec![false]);
        assert_eq!(backend.watcher_count(), 0);
    }

    #[test]
    fn unwatching_an_unknown_handle_is_a_no_op() {
        let backend = MemoryConnectivityBackend::new();
        backend.unwatch(WatchHandle::new(7)).expect("unwatch");
    }
}
