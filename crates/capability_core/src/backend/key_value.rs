//! Key/value storage backend contract (JSON stored as text per key).

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::BackendFuture;

/// Storage backend for JSON text keyed by string.
pub trait KeyValueBackend {
    /// Returns whether the backing store is present in this environment.
    fn supported(&self) -> bool;

    /// Loads the raw JSON string stored under `key`.
    fn load<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Result<Option<String>, String>>;

    /// Stores a raw JSON string under `key`.
    fn save<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> BackendFuture<'a, Result<(), String>>;

    /// Removes `key` from the store.
    fn delete<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Result<(), String>>;
}

/// Backend for environments without any key/value store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopKeyValueBackend;

impl KeyValueBackend for NoopKeyValueBackend {
    fn supported(&self) -> bool {
        false
    }

    fn load<'a>(&'a self, _key: &'a str) -> BackendFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete<'a>(&'a self, _key: &'a str) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

/// In-memory key/value backend keyed by string.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueBackend {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueBackend for MemoryKeyValueBackend {
    fn supported(&self) -> bool {
        true
    }

    fn load<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().get(key).cloned()) })
    }

    fn save<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(key.to_string(), raw_json.to_string());
            Ok(())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().remove(key);
            Ok(())
        })
    }
}
