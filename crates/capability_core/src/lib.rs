#![warn(missing_docs, rustdoc::broken_intra_doc_links)]
//! Core building blocks for observable browser-capability adapters.
//!
//! Every adapter follows the same shape: a probe decides whether the
//! capability exists, an [`ObservableState`] holds an immutable snapshot that
//! is replaced wholesale on every change, subscribers get the current
//! snapshot replayed once at registration and every later snapshot in
//! registration order, and operations translate native failures into the
//! typed [`CapabilityError`] taxonomy.
//!
//! This crate is platform-agnostic. Backend traits in [`backend`] describe
//! the native surfaces an adapter needs, with `Memory*` implementations for
//! tests and `Noop*` implementations for environments where a capability is
//! absent. Browser-backed implementations live in the companion web crate.

pub mod abort;
pub mod backend;
pub mod error;
pub mod probe;
pub mod scoped;
pub mod state;

pub use abort::{race_abort, AbortHandle, AbortToken};
pub use backend::{
    BackendFuture, BusPort, ClipboardBackend, ConnectivityBackend, ConnectivityCallback,
    KeyValueBackend, MemoryClipboardBackend, MemoryConnectivityBackend, MemoryKeyValueBackend,
    MemoryMessageBus, MessageBus, MessageCallback, NoopClipboardBackend, NoopConnectivityBackend,
    NoopKeyValueBackend, NoopMessageBus, PermissionState, WatchHandle,
};
pub use error::CapabilityError;
pub use probe::{probe_global_property, CapabilityDescriptor, ProbeFn, ProbeRegistry};
pub use scoped::with_scoped;
pub use state::{AdapterState, ObservableState, Subscription};
