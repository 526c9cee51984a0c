//! Observable adapter over a single stored JSON value.

use capability_core::{AdapterState, CapabilityError, KeyValueBackend, ObservableState};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Stable capability name for stored-value diagnostics and probing.
pub const STORED_VALUE_CAPABILITY: &str = "stored-value";

/// Configuration for one stored value: the storage key and the value to fall
/// back on when the key is absent or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValueConfig {
    /// Storage key the value lives under.
    pub key: String,
    /// Value used when the key is absent; also the value restored on removal.
    pub default: Value,
}

impl StoredValueConfig {
    /// Configures `key` with a `null` default.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: Value::Null,
        }
    }

    /// Replaces the fallback value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

/// Status fields of the stored-value snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValueStatus {
    /// Last value read from or written to storage, or the configured default.
    pub value: Value,
}

/// Observable adapter for one JSON value in a key/value store.
///
/// Writing `null` removes the key and restores the configured default, so a
/// stored `null` and an absent key are indistinguishable by design.
pub struct StoredValueAdapter<B> {
    backend: B,
    config: StoredValueConfig,
    state: ObservableState<StoredValueStatus>,
}

impl<B: KeyValueBackend> StoredValueAdapter<B> {
    /// Probes `backend` and builds the adapter at its rest state.
    pub fn new(backend: B, config: StoredValueConfig) -> Self {
        let supported = backend.supported();
        let state = ObservableState::new(
            supported,
            StoredValueStatus {
                value: config.default.clone(),
            },
        );
        Self {
            backend,
            config,
            state,
        }
    }

    /// Returns the observable state for subscription and inspection.
    pub fn state(&self) -> &ObservableState<StoredValueStatus> {
        &self.state
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> std::rc::Rc<AdapterState<StoredValueStatus>> {
        self.state.get()
    }

    fn ensure_supported(&self) -> Result<(), CapabilityError> {
        if self.state.supported() {
            Ok(())
        } else {
            Err(self
                .state
                .record_failure(CapabilityError::unsupported(STORED_VALUE_CAPABILITY)))
        }
    }

    fn native(&self, message: impl Into<String>) -> CapabilityError {
        self.state
            .record_failure(CapabilityError::native(STORED_VALUE_CAPABILITY, message))
    }

    /// Reads the stored value, falling back to the configured default when
    /// the key is absent.
    ///
    /// # Errors
    ///
    /// `Unsupported` when no store is present, `Native` when the store
    /// rejects or the stored text is not valid JSON.
    pub async fn get_value(&self) -> Result<Value, CapabilityError> {
        self.ensure_supported()?;
        self.state.begin_attempt();

        let raw = self
            .backend
            .load(&self.config.key)
            .await
            .map_err(|message| self.native(message))?;
        let value = match raw {
            None => self.config.default.clone(),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|error| self.native(error.to_string()))?,
        };
        let stored = value.clone();
        self.state.update(|state| state.status.value = stored);
        Ok(value)
    }

    /// Stores `value` under the configured key.
    ///
    /// `Value::Null` removes the key and restores the configured default.
    pub async fn set_value(&self, value: Value) -> Result<(), CapabilityError> {
        self.ensure_supported()?;
        self.state.begin_attempt();

        if value.is_null() {
            self.backend
                .delete(&self.config.key)
                .await
                .map_err(|message| self.native(message))?;
            let default = self.config.default.clone();
            self.state.update(|state| state.status.value = default);
            return Ok(());
        }

        let raw = serde_json::to_string(&value)
            .map_err(|error| self.native(error.to_string()))?;
        self.backend
            .save(&self.config.key, &raw)
            .await
            .map_err(|message| self.native(message))?;
        self.state.update(|state| state.status.value = value);
        Ok(())
    }

    /// Reads the stored value decoded into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self) -> Result<T, CapabilityError> {
        let value = self.get_value().await?;
        serde_json::from_value(value).map_err(|error| self.native(error.to_string()))
    }

    /// Stores `value` encoded through its `Serialize` impl.
    pub async fn set_as<T: Serialize>(&self, value: &T) -> Result<(), CapabilityError> {
        let value = serde_json::to_value(value)
            .map_err(|error| self.native(error.to_string()))?;
        self.set_value(value).await
    }
}

#[cfg(test)]
mod tests {
    use capability_core::{MemoryKeyValueBackend, NoopKeyValueBackend};
    use futures::executor::block_on;
    use serde_json::json;

    use super::*;

    fn adapter_with_default(default: Value) -> StoredValueAdapter<MemoryKeyValueBackend> {
        StoredValueAdapter::new(
            MemoryKeyValueBackend::default(),
            StoredValueConfig::new("test.value").with_default(default),
        )
    }

    #[test]
    fn round_trips_a_json_object() {
        let adapter = adapter_with_default(Value::Null);
        block_on(async {
            adapter.set_value(json!({"a": 1})).await.expect("set");
            assert_eq!(adapter.get_value().await.expect("get"), json!({"a": 1}));
        });
        assert_eq!(adapter.snapshot().status.value, json!({"a": 1}));
        assert_eq!(adapter.snapshot().last_error, None);
    }

    #[test]
    fn absent_key_yields_the_default() {
        let adapter = adapter_with_default(json!("light"));
        let value = block_on(adapter.get_value()).expect("get");
        assert_eq!(value, json!("light"));
    }

    #[test]
    fn writing_null_removes_and_restores_the_default() {
        let backend = MemoryKeyValueBackend::default();
        let adapter = StoredValueAdapter::new(
            backend.clone(),
            StoredValueConfig::new("test.value").with_default(json!(0)),
        );
        block_on(async {
            adapter.set_value(json!(42)).await.expect("set");
            adapter.set_value(Value::Null).await.expect("clear");
        });

        use capability_core::KeyValueBackend;
        assert_eq!(block_on(backend.load("test.value")).expect("load"), None);
        assert_eq!(block_on(adapter.get_value()).expect("get"), json!(0));
        assert_eq!(adapter.snapshot().status.value, json!(0));
    }

    #[test]
    fn unsupported_store_rejects_and_records() {
        let adapter = StoredValueAdapter::new(
            NoopKeyValueBackend,
            StoredValueConfig::new("test.value"),
        );
        let error = block_on(adapter.get_value()).expect_err("get");
        assert_eq!(error, CapabilityError::unsupported(STORED_VALUE_CAPABILITY));
        assert_eq!(adapter.snapshot().last_error, Some(error));
        assert!(!adapter.snapshot().supported);
    }

    #[test]
    fn corrupt_stored_text_is_a_native_error() {
        let backend = MemoryKeyValueBackend::default();
        block_on(capability_core::KeyValueBackend::save(
            &backend,
            "test.value",
            "not json",
        ))
        .expect("seed");
        let adapter =
            StoredValueAdapter::new(backend, StoredValueConfig::new("test.value"));

        let error = block_on(adapter.get_value()).expect_err("get");
        assert!(matches!(error, CapabilityError::Native { .. }));
        assert_eq!(adapter.snapshot().last_error, Some(error));
    }

    #[test]
    fn next_attempt_clears_a_recorded_failure() {
        let adapter = adapter_with_default(Value::Null);
        adapter
            .state()
            .record_failure(CapabilityError::native(STORED_VALUE_CAPABILITY, "boom"));
        block_on(adapter.set_value(json!(1))).expect("set");
        assert_eq!(adapter.snapshot().last_error, None);
    }

    #[test]
    fn typed_helpers_round_trip() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Prefs {
            theme: String,
        }

        let adapter = adapter_with_default(json!({"theme": "light"}));
        block_on(async {
            adapter
                .set_as(&Prefs {
                    theme: "dark".to_string(),
                })
                .await
                .expect("set");
            let prefs: Prefs = adapter.get_as().await.expect("get");
            assert_eq!(prefs.theme, "dark");
        });
    }

    #[test]
    fn subscribers_see_writes() {
        use std::{cell::RefCell, rc::Rc};

        let adapter = adapter_with_default(json!(null));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = adapter
            .state()
            .subscribe(move |snapshot| sink.borrow_mut().push(snapshot.status.value.clone()));

        block_on(adapter.set_value(json!("dark"))).expect("set");
        subscription.unsubscribe();
        block_on(adapter.set_value(json!("light"))).expect("set");

        assert_eq!(*seen.borrow(), vec![json!(null), json!("dark")]);
    }
}
