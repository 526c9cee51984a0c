//! Clipboard backend contract with permission reporting.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use super::BackendFuture;

/// Outcome of a clipboard permission query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// Access has been granted.
    Granted,
    /// Access has been denied.
    Denied,
    /// Access will trigger a user prompt.
    Prompt,
    /// The permission model is absent or the query itself failed.
    Unknown,
}

impl PermissionState {
    /// Returns the lowercase label used in logs and snapshots.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
            Self::Unknown => "unknown",
        }
    }
}

/// Clipboard backend for plain-text read and write.
pub trait ClipboardBackend {
    /// Returns whether a clipboard surface is present in this environment.
    fn supported(&self) -> bool;

    /// Queries read permission without touching clipboard contents.
    fn query_permission(&self) -> BackendFuture<'_, Result<PermissionState, String>>;

    /// Reads the clipboard as plain text.
    fn read_text(&self) -> BackendFuture<'_, Result<String, String>>;

    /// Replaces the clipboard contents with `text`.
    fn write_text<'a>(&'a self, text: &'a str) -> BackendFuture<'a, Result<(), String>>;
}

/// Backend for environments without a clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClipboardBackend;

impl ClipboardBackend for NoopClipboardBackend {
    fn supported(&self) -> bool {
        false
    }

    fn query_permission(&self) -> BackendFuture<'_, Result<PermissionState, String>> {
        Box::pin(async { Ok(PermissionState::Unknown) })
    }

    fn read_text(&self) -> BackendFuture<'_, Result<String, String>> {
        Box::pin(async { Ok(String::new()) })
    }

    fn write_text<'a>(&'a self, _text: &'a str) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

/// In-memory clipboard with a scriptable permission state and call counters.
#[derive(Debug, Clone)]
pub struct MemoryClipboardBackend {
    permission: Rc<Cell<PermissionState>>,
    text: Rc<RefCell<String>>,
    read_calls: Rc<Cell<u32>>,
    write_calls: Rc<Cell<u32>>,
}

impl Default for MemoryClipboardBackend {
    fn default() -> Self {
        Self {
            permission: Rc::new(Cell::new(PermissionState::Granted)),
            text: Rc::new(RefCell::new(String::new())),
            read_calls: Rc::new(Cell::new(0)),
            write_calls: Rc::new(Cell::new(0)),
        }
    }
}

impl MemoryClipboardBackend {
    /// Creates a backend with permission granted and empty contents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the permission state returned by [`ClipboardBackend::query_permission`].
    pub fn set_permission(&self, state: PermissionState) {
        self.permission.set(state);
    }

    /// Seeds the clipboard contents directly.
    pub fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    /// Returns how many times [`ClipboardBackend::read_text`] was called.
    pub fn read_calls(&self) -> u32 {
        self.read_calls.get()
    }

    /// Returns how many times [`ClipboardBackend::write_text`] was called.
    pub fn write_calls(&self) -> u32 {
        self.write_calls.get()
    }
}

impl ClipboardBackend for MemoryClipboardBackend {
    fn supported(&self) -> bool {
        true
    }

    fn query_permission(&self) -> BackendFuture<'_, Result<PermissionState, String>> {
        Box::pin(async move { Ok(self.permission.get()) })
    }

    fn read_text(&self) -> BackendFuture<'_, Result<String, String>> {
        Box::pin(async move {
            self.read_calls.set(self.read_calls.get() + 1);
            Ok(self.text.borrow().clone())
        })
    }

    fn write_text<'a>(&'a self, text: &'a str) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.write_calls.set(self.write_calls.get() + 1);
            *self.text.borrow_mut() = text.to_string();
            Ok(())
        })
    }
}
