//! Capability backend contracts with in-memory and no-op implementations.
//!
//! Backends sit at the native boundary and report failures as plain strings;
//! adapters translate those into the typed [`crate::CapabilityError`]
//! taxonomy. `Memory*` backends are deterministic, instance-owned stand-ins
//! for tests and non-browser builds; `Noop*` backends model an environment
//! where the capability is absent.

use std::{future::Future, pin::Pin};

pub mod clipboard;
pub mod connectivity;
pub mod key_value;
pub mod message_bus;

pub use clipboard::{
    ClipboardBackend, MemoryClipboardBackend, NoopClipboardBackend, PermissionState,
};
pub use connectivity::{
    ConnectivityBackend, ConnectivityCallback, MemoryConnectivityBackend,
    NoopConnectivityBackend, WatchHandle,
};
pub use key_value::{KeyValueBackend, MemoryKeyValueBackend, NoopKeyValueBackend};
pub use message_bus::{
    BusPort, MemoryMessageBus, MessageBus, MessageCallback, NoopMessageBus,
};

/// Object-safe boxed future used by backend trait methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;
