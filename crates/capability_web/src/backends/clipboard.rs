//! Clipboard backend over `navigator.clipboard` and the Permissions API.

use capability_core::{probe_global_property, BackendFuture, ClipboardBackend, PermissionState};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;

/// [`ClipboardBackend`] backed by the async clipboard API.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebClipboardBackend;

impl WebClipboardBackend {
    /// Creates the backend. Presence of the clipboard is probed per instance.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
fn clipboard() -> Result<web_sys::Clipboard, String> {
    Ok(super::browser_window()?.navigator().clipboard())
}

#[cfg(target_arch = "wasm32")]
async fn query_clipboard_read() -> Result<PermissionState, JsValue> {
    let permissions = super::browser_window()
        .map_err(JsValue::from)?
        .navigator()
        .permissions()?;
    let descriptor = js_sys::Object::new();
    js_sys::Reflect::set(
        &descriptor,
        &JsValue::from_str("name"),
        &JsValue::from_str("clipboard-read"),
    )?;
    let status: web_sys::PermissionStatus =
        JsFuture::from(permissions.query(&descriptor)?).await?.dyn_into()?;
    Ok(match status.state() {
        web_sys::PermissionState::Granted => PermissionState::Granted,
        web_sys::PermissionState::Denied => PermissionState::Denied,
        web_sys::PermissionState::Prompt => PermissionState::Prompt,
        _ => PermissionState::Unknown,
    })
}

impl ClipboardBackend for WebClipboardBackend {
    fn supported(&self) -> bool {
        probe_global_property("navigator.clipboard")
    }

    fn query_permission(&self) -> BackendFuture<'_, Result<PermissionState, String>> {
        Box::pin(async {
            #[cfg(target_arch = "wasm32")]
            {
                // Browsers that lack the `clipboard-read` permission name
                // reject the query; that is an unknown state, not a failure.
                Ok(query_clipboard_read()
                    .await
                    .unwrap_or(PermissionState::Unknown))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Ok(PermissionState::Unknown)
            }
        })
    }

    fn read_text(&self) -> BackendFuture<'_, Result<String, String>> {
        Box::pin(async {
            #[cfg(target_arch = "wasm32")]
            {
                let value = JsFuture::from(clipboard()?.read_text())
                    .await
                    .map_err(super::js_error_to_string)?;
                value
                    .as_string()
                    .ok_or_else(|| "clipboard did not return text".to_string())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Ok(String::new())
            }
        })
    }

    fn write_text<'a>(&'a self, text: &'a str) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                JsFuture::from(clipboard()?.write_text(text))
                    .await
                    .map(|_| ())
                    .map_err(super::js_error_to_string)
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = text;
                Ok(())
            }
        })
    }
}
