//! Connectivity backend over `navigator.onLine` and the online/offline events.

use capability_core::{
    probe_global_property, ConnectivityBackend, ConnectivityCallback, WatchHandle,
};

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

#[cfg(target_arch = "wasm32")]
struct Watcher {
    online: Closure<dyn FnMut(web_sys::Event)>,
    offline: Closure<dyn FnMut(web_sys::Event)>,
}

#[cfg(target_arch = "wasm32")]
#[derive(Default)]
struct WatcherState {
    next_id: u64,
    watchers: BTreeMap<u64, Watcher>,
}

/// [`ConnectivityBackend`] reading `navigator.onLine` and listening for the
/// window's `online` and `offline` events.
#[derive(Default)]
pub struct WebConnectivityBackend {
    #[cfg(target_arch = "wasm32")]
    state: Rc<RefCell<WatcherState>>,
}

impl WebConnectivityBackend {
    /// Creates the backend with no registered watchers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConnectivityBackend for WebConnectivityBackend {
    fn supported(&self) -> bool {
        probe_global_property("navigator.onLine")
    }

    fn is_online(&self) -> Result<bool, String> {
        #[cfg(target_arch = "wasm32")]
        {
            Ok(super::browser_window()?.navigator().on_line())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(false)
        }
    }

    fn watch(&self, on_change: ConnectivityCallback) -> Result<WatchHandle, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let window = super::browser_window()?;
            let on_online = Rc::clone(&on_change);
            let online = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                on_online(true);
            });
            let offline = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                on_change(false);
            });
            window
                .add_event_listener_with_callback("online", online.as_ref().unchecked_ref())
                .map_err(super::js_error_to_string)?;
            window
                .add_event_listener_with_callback("offline", offline.as_ref().unchecked_ref())
                .map_err(super::js_error_to_string)?;

            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.watchers.insert(id, Watcher { online, offline });
            Ok(WatchHandle::new(id))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = on_change;
            Ok(WatchHandle::new(0))
        }
    }

    fn unwatch(&self, handle: WatchHandle) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(watcher) = self.state.borrow_mut().watchers.remove(&handle.id()) else {
                return Ok(());
            };
            let window = super::browser_window()?;
            window
                .remove_event_listener_with_callback(
                    "online",
                    watcher.online.as_ref().unchecked_ref(),
                )
                .map_err(super::js_error_to_string)?;
            window
                .remove_event_listener_with_callback(
                    "offline",
                    watcher.offline.as_ref().unchecked_ref(),
                )
                .map_err(super::js_error_to_string)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = handle;
            Ok(())
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn reports_unsupported_off_wasm() {
        let backend = WebConnectivityBackend::new();
        assert!(!backend.supported());
        assert!(!backend.is_online().expect("is_online"));
    }
}
