#![warn(missing_docs, rustdoc::broken_intra_doc_links)]
//! Observable adapters over browser capabilities.
//!
//! Each adapter pairs a backend trait from `capability_core` with an
//! observable snapshot: construction probes the capability, operations
//! delegate to the backend and translate failures into the typed error
//! taxonomy, and subscribers follow every snapshot change. Browser-backed
//! backends live in [`backends`]; the in-memory backends from
//! `capability_core` slot into the same adapters for tests and non-browser
//! targets.
//!
//! ```
//! use capability_core::MemoryKeyValueBackend;
//! use capability_web::{StoredValueAdapter, StoredValueConfig};
//! use futures::executor::block_on;
//! use serde_json::json;
//!
//! let adapter = StoredValueAdapter::new(
//!     MemoryKeyValueBackend::default(),
//!     StoredValueConfig::new("ui.theme").with_default(json!("light")),
//! );
//! block_on(async {
//!     adapter.set_value(json!("dark")).await.expect("set");
//!     assert_eq!(adapter.get_value().await.expect("get"), json!("dark"));
//! });
//! ```

pub mod backends;
pub mod channel;
pub mod clipboard;
pub mod connectivity;
pub mod descriptors;
pub mod stored_value;

pub use backends::{
    WebClipboardBackend, WebConnectivityBackend, WebKeyValueBackend, WebMessageBus,
};
pub use channel::{ChannelAdapter, ChannelConfig, ChannelStatus, CHANNEL_CAPABILITY};
pub use clipboard::{ClipboardAdapter, ClipboardStatus, CLIPBOARD_CAPABILITY};
pub use connectivity::{
    ConnectivityAdapter, ConnectivityStatus, CONNECTIVITY_CAPABILITY,
};
pub use descriptors::browser_capability_registry;
pub use stored_value::{
    StoredValueAdapter, StoredValueConfig, StoredValueStatus, STORED_VALUE_CAPABILITY,
};
