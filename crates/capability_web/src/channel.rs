//! Observable adapter over a named broadcast channel.

use std::{cell::Cell, future::Future, rc::Rc};

use capability_core::{
    with_scoped, AdapterState, BusPort, CapabilityError, MessageBus, MessageCallback,
    ObservableState,
};
use serde_json::Value;

/// Stable capability name for broadcast-channel diagnostics and probing.
pub const CHANNEL_CAPABILITY: &str = "broadcast-channel";

/// Configuration for one broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel name shared by every participating context.
    pub name: String,
}

impl ChannelConfig {
    /// Configures the channel named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Status fields of the broadcast-channel snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStatus {
    /// Whether this adapter currently holds an open port.
    pub open: bool,
    /// Most recent message received from another port, if any.
    pub last_message: Option<Value>,
    /// Running count of received messages.
    pub received: u64,
}

/// Observable adapter for one port on a named broadcast channel.
///
/// `open` is idempotent and returns the existing port; `close` is an
/// idempotent teardown. Messages posted by this port are never delivered
/// back to it.
pub struct ChannelAdapter<B> {
    backend: B,
    config: ChannelConfig,
    state: ObservableState<ChannelStatus>,
    port: Cell<Option<BusPort>>,
}

impl<B: MessageBus> ChannelAdapter<B> {
    /// Probes `backend` and builds the adapter with no open port.
    pub fn new(backend: B, config: ChannelConfig) -> Self {
        let supported = backend.supported();
        let state = ObservableState::new(
            supported,
            ChannelStatus {
                open: false,
                last_message: None,
                received: 0,
            },
        );
        Self {
            backend,
            config,
            state,
            port: Cell::new(None),
        }
    }

    /// Returns the observable state for subscription and inspection.
    pub fn state(&self) -> &ObservableState<ChannelStatus> {
        &self.state
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Rc<AdapterState<ChannelStatus>> {
        self.state.get()
    }

    fn ensure_supported(&self) -> Result<(), CapabilityError> {
        if self.state.supported() {
            Ok(())
        } else {
            Err(self
                .state
                .record_failure(CapabilityError::unsupported(CHANNEL_CAPABILITY)))
        }
    }

    fn native(&self, message: impl Into<String>) -> CapabilityError {
        self.state
            .record_failure(CapabilityError::native(CHANNEL_CAPABILITY, message))
    }

    /// Opens a port on the configured channel.
    ///
    /// Calling `open` while a port is already open returns that port.
    pub fn open(&self) -> Result<BusPort, CapabilityError> {
        self.ensure_supported()?;
        if let Some(port) = self.port.get() {
            return Ok(port);
        }
        self.state.begin_attempt();

        let state = self.state.clone();
        let on_message: MessageCallback = Rc::new(move |payload| {
            state.update(|snapshot| {
                snapshot.status.last_message = Some(payload);
                snapshot.status.received += 1;
            });
        });
        let port = self
            .backend
            .open(&self.config.name, on_message)
            .map_err(|message| self.native(message))?;
        self.port.set(Some(port));
        self.state.update(|snapshot| snapshot.status.open = true);
        Ok(port)
    }

    /// Posts `payload` to every other port on the channel.
    ///
    /// # Errors
    ///
    /// `Precondition` when the adapter has not opened its port.
    pub async fn post(&self, payload: &Value) -> Result<(), CapabilityError> {
        self.ensure_supported()?;
        self.state.begin_attempt();

        let Some(port) = self.port.get() else {
            return Err(self.state.record_failure(CapabilityError::precondition(
                CHANNEL_CAPABILITY,
                "channel is not open",
            )));
        };
        self.backend
            .post(port, payload)
            .await
            .map_err(|message| self.native(message))
    }

    /// Closes the port if one is open. Closing an already-closed adapter is
    /// a no-op that succeeds even when the capability is unsupported.
    ///
    /// On failure the port handle is kept so `close` can be retried; the
    /// adapter stays open until the backend actually releases the port.
    pub fn close(&self) -> Result<(), CapabilityError> {
        let Some(port) = self.port.get() else {
            return Ok(());
        };
        self.backend
            .close(port)
            .map_err(|message| self.native(message))?;
        self.port.set(None);
        self.state.update(|snapshot| snapshot.status.open = false);
        Ok(())
    }

    /// Opens the channel, runs `body` with the port, and closes on every
    /// exit path.
    ///
    /// Close failures do not override `body`'s result; they are reported
    /// through the snapshot like any other failure.
    pub async fn with_open<T, Body, Fut>(&self, body: Body) -> Result<T, CapabilityError>
    where
        Body: FnOnce(BusPort) -> Fut,
        Fut: Future<Output = Result<T, CapabilityError>>,
    {
        let port = self.open()?;
        with_scoped(
            port,
            |_| {
                let _ = self.close();
            },
            |port| body(*port),
        )
        .await
    }
}
