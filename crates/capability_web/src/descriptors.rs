//! Descriptor table mapping browser capabilities to their probes.

use capability_core::{probe_global_property, CapabilityDescriptor, ProbeRegistry};

use crate::{
    channel::CHANNEL_CAPABILITY, clipboard::CLIPBOARD_CAPABILITY,
    connectivity::CONNECTIVITY_CAPABILITY, stored_value::STORED_VALUE_CAPABILITY,
};

/// Builds the registry of browser capabilities this crate provides.
///
/// Each probe checks the exact API surface the matching backend calls, so a
/// positive probe means the adapter's operations have something to talk to.
pub fn browser_capability_registry() -> ProbeRegistry {
    let mut registry = ProbeRegistry::new();
    registry.register(CapabilityDescriptor {
        name: STORED_VALUE_CAPABILITY,
        probe: || probe_global_property("localStorage"),
    });
    registry.register(CapabilityDescriptor {
        name: CHANNEL_CAPABILITY,
        probe: || probe_global_property("BroadcastChannel"),
    });
    registry.register(CapabilityDescriptor {
        name: CLIPBOARD_CAPABILITY,
        probe: || probe_global_property("navigator.clipboard"),
    });
    registry.register(CapabilityDescriptor {
        name: CONNECTIVITY_CAPABILITY,
        probe: || probe_global_property("navigator.onLine"),
    });
    registry
}
