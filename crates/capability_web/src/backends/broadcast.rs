//! Message bus backend over the `BroadcastChannel` API.

use capability_core::{
    probe_global_property, BackendFuture, BusPort, MessageBus, MessageCallback,
};
use serde_json::Value;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

#[cfg(target_arch = "wasm32")]
use serde::Serialize;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

#[cfg(target_arch = "wasm32")]
struct OpenChannel {
    channel: web_sys::BroadcastChannel,
    // Kept alive for as long as the channel is open; dropping the closure
    // would invalidate the onmessage handler.
    _on_message: Closure<dyn FnMut(web_sys::MessageEvent)>,
}

#[cfg(target_arch = "wasm32")]
#[derive(Default)]
struct BusState {
    next_id: u64,
    channels: BTreeMap<u64, OpenChannel>,
}

/// [`MessageBus`] backed by browser `BroadcastChannel` instances.
///
/// Each open port owns its own `BroadcastChannel`, so the browser enforces
/// the rule that a poster never receives its own message.
#[derive(Default)]
pub struct WebMessageBus {
    #[cfg(target_arch = "wasm32")]
    state: Rc<RefCell<BusState>>,
}

impl WebMessageBus {
    /// Creates a bus with no open ports.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageBus for WebMessageBus {
    fn supported(&self) -> bool {
        probe_global_property("BroadcastChannel")
    }

    fn open(&self, channel: &str, on_message: MessageCallback) -> Result<BusPort, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let native = web_sys::BroadcastChannel::new(channel)
                .map_err(super::js_error_to_string)?;
            let closure = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
                move |event: web_sys::MessageEvent| {
                    // Payloads that do not decode as JSON are dropped rather
                    // than surfaced as an error on the receiving side.
                    if let Ok(payload) = serde_wasm_bindgen::from_value::<Value>(event.data()) {
                        on_message(payload);
                    }
                },
            );
            native.set_onmessage(Some(closure.as_ref().unchecked_ref()));

            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.channels.insert(
                id,
                OpenChannel {
                    channel: native,
                    _on_message: closure,
                },
            );
            Ok(BusPort::new(id))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (channel, on_message);
            Ok(BusPort::new(0))
        }
    }

    fn post<'a>(
        &'a self,
        port: BusPort,
        payload: &'a Value,
    ) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let state = self.state.borrow();
                let Some(open) = state.channels.get(&port.id()) else {
                    return Err("bus port is not open".to_string());
                };
                let serializer = serde_wasm_bindgen::Serializer::json_compatible();
                let message = payload
                    .serialize(&serializer)
                    .map_err(|error| error.to_string())?;
                open.channel
                    .post_message(&message)
                    .map_err(super::js_error_to_string)
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = (port, payload);
                Ok(())
            }
        })
    }

    fn close(&self, port: BusPort) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(open) = self.state.borrow_mut().channels.remove(&port.id()) {
                open.channel.set_onmessage(None);
                open.channel.close();
            }
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = port;
            Ok(())
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn reports_unsupported_off_wasm() {
        let bus = WebMessageBus::new();
        assert!(!bus.supported());
        bus.open("sync", Rc::new(|_| {})).expect("open");
    }
}
