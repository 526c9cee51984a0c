//! Browser-backed implementations of the core backend contracts.
//!
//! Each backend compiles on every target: on wasm32 it calls the matching
//! browser API, elsewhere it reports the capability as unsupported and its
//! operations reduce to benign no-ops.

pub mod broadcast;
pub mod clipboard;
pub mod connectivity;
pub mod local_storage;

pub use broadcast::WebMessageBus;
pub use clipboard::WebClipboardBackend;
pub use connectivity::WebConnectivityBackend;
pub use local_storage::WebKeyValueBackend;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
pub(crate) fn js_error_to_string(value: wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn browser_window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "window is unavailable".to_string())
}
