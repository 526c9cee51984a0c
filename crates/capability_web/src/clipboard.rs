//! Observable adapter over the plain-text clipboard.

use std::rc::Rc;

use capability_core::{
    race_abort, AbortToken, AdapterState, CapabilityError, ClipboardBackend, ObservableState,
    PermissionState,
};

/// Stable capability name for clipboard diagnostics and probing.
pub const CLIPBOARD_CAPABILITY: &str = "clipboard";

/// Status fields of the clipboard snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardStatus {
    /// Most recently observed read-permission state.
    pub permission: PermissionState,
    /// Text returned by the most recent successful read.
    pub last_read: Option<String>,
}

/// Observable adapter for plain-text clipboard access.
///
/// Reads query permission first and refuses to touch the clipboard when
/// access is denied. Both reads and writes accept an optional [`AbortToken`];
/// an already-aborted token rejects before any native call is made, and
/// aborts are never recorded as failures.
pub struct ClipboardAdapter<B> {
    backend: B,
    state: ObservableState<ClipboardStatus>,
}

impl<B: ClipboardBackend> ClipboardAdapter<B> {
    /// Probes `backend` and builds the adapter with an unknown permission.
    pub fn new(backend: B) -> Self {
        let supported = backend.supported();
        let state = ObservableState::new(
            supported,
            ClipboardStatus {
                permission: PermissionState::Unknown,
                last_read: None,
            },
        );
        Self { backend, state }
    }

    /// Returns the observable state for subscription and inspection.
    pub fn state(&self) -> &ObservableState<ClipboardStatus> {
        &self.state
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Rc<AdapterState<ClipboardStatus>> {
        self.state.get()
    }

    fn ensure_supported(&self) -> Result<(), CapabilityError> {
        if self.state.supported() {
            Ok(())
        } else {
            Err(self
                .state
                .record_failure(CapabilityError::unsupported(CLIPBOARD_CAPABILITY)))
        }
    }

    /// Queries read permission and records it in the snapshot.
    pub async fn query_permission(&self) -> Result<PermissionState, CapabilityError> {
        self.ensure_supported()?;
        self.state.begin_attempt();

        let permission = self
            .backend
            .query_permission()
            .await
            .map_err(|message| {
                self.state
                    .record_failure(CapabilityError::native(CLIPBOARD_CAPABILITY, message))
            })?;
        self.state
            .update(|snapshot| snapshot.status.permission = permission);
        Ok(permission)
    }

    /// Reads the clipboard as plain text.
    ///
    /// Permission is queried first; a `Denied` result blocks the read. Other
    /// permission states proceed, leaving the final word to the platform.
    pub async fn read_text(
        &self,
        abort: Option<&AbortToken>,
    ) -> Result<String, CapabilityError> {
        self.ensure_supported()?;
        self.state.begin_attempt();

        let operation = async {
            let permission = self
                .backend
                .query_permission()
                .await
                .map_err(|message| CapabilityError::native(CLIPBOARD_CAPABILITY, message))?;
            self.state
                .update(|snapshot| snapshot.status.permission = permission);
            if permission == PermissionState::Denied {
                return Err(CapabilityError::permission_denied(CLIPBOARD_CAPABILITY));
            }
            self.backend
                .read_text()
                .await
                .map_err(|message| CapabilityError::native(CLIPBOARD_CAPABILITY, message))
        };
        let text = race_abort(CLIPBOARD_CAPABILITY, abort, operation)
            .await
            .map_err(|error| self.state.record_failure(error))?;
        let read = text.clone();
        self.state
            .update(|snapshot| snapshot.status.last_read = Some(read));
        Ok(text)
    }

    /// Replaces the clipboard contents with `text`.
    pub async fn write_text(
        &self,
        text: &str,
        abort: Option<&AbortToken>,
    ) -> Result<(), CapabilityError> {
        self.ensure_supported()?;
        self.state.begin_attempt();

        let operation = async {
            self.backend
                .write_text(text)
                .await
                .map_err(|message| CapabilityError::native(CLIPBOARD_CAPABILITY, message))
        };
        race_abort(CLIPBOARD_CAPABILITY, abort, operation)
            .await
            .map_err(|error| self.state.record_failure(error))
    }
}

#[cfg(test)]
mod tests {
    use capability_core::{AbortHandle, MemoryClipboardBackend, NoopClipboardBackend};
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn read_round_trips_and_updates_the_snapshot() {
        let backend = MemoryClipboardBackend::new();
        backend.set_text("copied");
        let adapter = ClipboardAdapter::new(backend);

        let text = block_on(adapter.read_text(None)).expect("read");
        assert_eq!(text, "copied");

        let snapshot = adapter.snapshot();
        assert_eq!(snapshot.status.permission, PermissionState::Granted);
        assert_eq!(snapshot.status.last_read, Some("copied".to_string()));
        assert_eq!(snapshot.last_error, None);
    }

    #[test]
    fn denied_permission_blocks_the_read() {
        let backend = MemoryClipboardBackend::new();
        backend.set_permission(PermissionState::Denied);
        backend.set_text("secret");
        let adapter = ClipboardAdapter::new(backend.clone());

        let error = block_on(adapter.read_text(None)).expect_err("read");
        assert_eq!(error, CapabilityError::permission_denied(CLIPBOARD_CAPABILITY));
        assert_eq!(backend.read_calls(), 0);

        let snapshot = adapter.snapshot();
        assert_eq!(snapshot.status.permission, PermissionState::Denied);
        assert_eq!(snapshot.status.last_read, None);
        assert_eq!(snapshot.last_error, Some(error));
    }

    #[test]
    fn prompt_permission_still_attempts_the_read() {
        let backend = MemoryClipboardBackend::new();
        backend.set_permission(PermissionState::Prompt);
        backend.set_text("maybe");
        let adapter = ClipboardAdapter::new(backend.clone());

        let text = block_on(adapter.read_text(None)).expect("read");
        assert_eq!(text, "maybe");
        assert_eq!(backend.read_calls(), 1);
    }

    #[test]
    fn pre_aborted_read_makes_no_native_call() {
        let backend = MemoryClipboardBackend::new();
        let adapter = ClipboardAdapter::new(backend.clone());
        let handle = AbortHandle::new();
        let token = handle.token();
        handle.abort();

        let error = block_on(adapter.read_text(Some(&token))).expect_err("read");
        assert!(error.is_aborted());
        assert_eq!(backend.read_calls(), 0);
        assert_eq!(adapter.snapshot().last_error, None);
    }

    #[test]
    fn pre_aborted_write_makes_no_native_call() {
        let backend = MemoryClipboardBackend::new();
        let adapter = ClipboardAdapter::new(backend.clone());
        let handle = AbortHandle::new();
        let token = handle.token();
        handle.abort();

        let error = block_on(adapter.write_text("x", Some(&token))).expect_err("write");
        assert!(error.is_aborted());
        assert_eq!(backend.write_calls(), 0);
        assert_eq!(adapter.snapshot().last_error, None);
    }

    #[test]
    fn write_then_read_with_tokens_that_never_fire() {
        let backend = MemoryClipboardBackend::new();
        let adapter = ClipboardAdapter::new(backend);
        let handle = AbortHandle::new();
        let token = handle.token();

        block_on(adapter.write_text("hello", Some(&token))).expect("write");
        let text = block_on(adapter.read_text(Some(&token))).expect("read");
        assert_eq!(text, "hello");
    }

    #[test]
    fn unsupported_clipboard_rejects_without_backend_calls() {
        let adapter = ClipboardAdapter::new(NoopClipboardBackend);
        let error = block_on(adapter.read_text(None)).expect_err("read");
        assert_eq!(error, CapabilityError::unsupported(CLIPBOARD_CAPABILITY));
        assert_eq!(adapter.snapshot().last_error, Some(error));
    }
}
