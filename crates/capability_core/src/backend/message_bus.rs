//! Broadcast message bus backend contract.
//!
//! Ports on the same named channel receive each other's messages; a posting
//! port never receives its own message, matching browser broadcast semantics.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use serde_json::Value;

use super::BackendFuture;

/// Callback invoked with each message delivered to an open port.
pub type MessageCallback = Rc<dyn Fn(Value)>;

/// Handle identifying one open port on a message bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusPort(u64);

impl BusPort {
    /// Wraps a backend-assigned port id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the backend-assigned port id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Broadcast bus backend for JSON payloads on named channels.
pub trait MessageBus {
    /// Returns whether a broadcast transport is present in this environment.
    fn supported(&self) -> bool;

    /// Opens a port on `channel`, delivering incoming messages to `on_message`.
    fn open(&self, channel: &str, on_message: MessageCallback) -> Result<BusPort, String>;

    /// Posts `payload` to every other open port on the same channel.
    fn post<'a>(&'a self, port: BusPort, payload: &'a Value) -> BackendFuture<'a, Result<(), String>>;

    /// Closes `port`. Closing an unknown port is a no-op.
    fn close(&self, port: BusPort) -> Result<(), String>;
}

/// Backend for environments without any broadcast transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMessageBus;

impl MessageBus for NoopMessageBus {
    fn supported(&self) -> bool {
        false
    }

    fn open(&self, _channel: &str, _on_message: MessageCallback) -> Result<BusPort, String> {
        Ok(BusPort::new(0))
    }

    fn post<'a>(
        &'a self,
        _port: BusPort,
        _payload: &'a Value,
    ) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn close(&self, _port: BusPort) -> Result<(), String> {
        Ok(())
    }
}

struct OpenPort {
    channel: String,
    on_message: MessageCallback,
}

/// In-memory broadcast bus delivering messages between ports synchronously.
#[derive(Clone, Default)]
pub struct MemoryMessageBus {
    next_id: Rc<Cell<u64>>,
    // BTreeMap keeps delivery in ascending port-id order, which matches the
    // order ports were opened.
    ports: Rc<RefCell<BTreeMap<u64, OpenPort>>>,
}

impl MemoryMessageBus {
    /// Creates an empty bus with no open ports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of currently open ports across all channels.
    pub fn open_ports(&self) -> usize {
        self.ports.borrow().len()
    }
}

impl MessageBus for MemoryMessageBus {
    fn supported(&self) -> bool {
        true
    }

    fn open(&self, channel: &str, on_message: MessageCallback) -> Result<BusPort, String> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.ports.borrow_mut().insert(
            id,
            OpenPort {
                channel: channel.to_string(),
                on_message,
            },
        );
        Ok(BusPort::new(id))
    }

    fn post<'a>(
        &'a self,
        port: BusPort,
        payload: &'a Value,
    ) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let targets: Vec<MessageCallback> = {
                let ports = self.ports.borrow();
                let Some(sender) = ports.get(&port.id()) else {
                    return Err("bus port is not open".to_string());
                };
                ports
                    .iter()
                    .filter(|(id, open)| **id != port.id() && open.channel == sender.channel)
                    .map(|(_, open)| Rc::clone(&open.on_message))
                    .collect()
            };
            for callback in targets {
                callback(payload.clone());
            }
            Ok(())
        })
    }

    fn close(&self, port: BusPort) -> Result<(), String> {
        self.ports.borrow_mut().remove(&port.id());
        Ok(())
    }
}
