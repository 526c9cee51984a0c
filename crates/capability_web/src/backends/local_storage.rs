//! Key/value backend over `window.localStorage`.

use capability_core::{probe_global_property, BackendFuture, KeyValueBackend};

/// [`KeyValueBackend`] storing JSON text in the browser's local storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebKeyValueBackend;

impl WebKeyValueBackend {
    /// Creates the backend. Presence of local storage is probed per instance.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    super::browser_window()?
        .local_storage()
        .map_err(super::js_error_to_string)?
        .ok_or_else(|| "local storage is unavailable".to_string())
}

impl KeyValueBackend for WebKeyValueBackend {
    fn supported(&self) -> bool {
        probe_global_property("localStorage")
    }

    fn load<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                local_storage()?
                    .get_item(key)
                    .map_err(super::js_error_to_string)
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = key;
                Ok(None)
            }
        })
    }

    fn save<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                local_storage()?
                    .set_item(key, raw_json)
                    .map_err(super::js_error_to_string)
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = (key, raw_json);
                Ok(())
            }
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                local_storage()?
                    .remove_item(key)
                    .map_err(super::js_error_to_string)
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = key;
                Ok(())
            }
        })
    }
}
