//! Capability probing and the capability-descriptor table.
//!
//! Probes check the exact API surface an adapter will call, not a proxy
//! signal, so a capability that passes its probe is the capability that gets
//! used.

/// Synchronous feature-detection check for one capability.
pub type ProbeFn = fn() -> bool;

/// One entry in a [`ProbeRegistry`]: a stable name and its detection check.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityDescriptor {
    /// Stable capability identifier, matching the adapter's error label.
    pub name: &'static str,
    /// Detection check for the capability's exact API surface.
    pub probe: ProbeFn,
}

/// Explicit table mapping capability names to detection checks.
///
/// New capabilities are added by registering descriptors rather than by
/// scattering ad hoc conditionals.
#[derive(Debug, Default)]
pub struct ProbeRegistry {
    entries: Vec<CapabilityDescriptor>,
}

impl ProbeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `descriptor`, replacing any prior entry with the same name.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|entry| entry.name == descriptor.name)
        {
            *existing = descriptor;
        } else {
            self.entries.push(descriptor);
        }
    }

    /// Runs the probe registered under `name`.
    ///
    /// Returns `None` for unknown capability names.
    pub fn probe(&self, name: &str) -> Option<bool> {
        self.descriptor(name).map(|entry| (entry.probe)())
    }

    /// Returns the descriptor registered under `name`.
    pub fn descriptor(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Iterates registered capability names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Returns the number of registered capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Checks a dotted property path against the JS global object.
///
/// `probe_global_property("navigator.clipboard")` resolves `navigator` on the
/// global and then tests for a `clipboard` property. The final segment is
/// tested with a `has` check so properties holding `false` or `null` still
/// count as present. Always `false` off wasm32.
pub fn probe_global_property(path: &str) -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsValue;

        let mut current: JsValue = js_sys::global().into();
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            if current.is_null() || current.is_undefined() {
                return false;
            }
            let key = JsValue::from_str(segment);
            if segments.peek().is_none() {
                return js_sys::Reflect::has(&current, &key).unwrap_or(false);
            }
            current = match js_sys::Reflect::get(&current, &key) {
                Ok(value) => value,
                Err(_) => return false,
            };
        }
        false
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = path;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_probes_by_name() {
        let mut registry = ProbeRegistry::new();
        registry.register(CapabilityDescriptor {
            name: "always-on",
            probe: || true,
        });
        registry.register(CapabilityDescriptor {
            name: "always-off",
            probe: || false,
        });

        assert_eq!(registry.probe("always-on"), Some(true));
        assert_eq!(registry.probe("always-off"), Some(false));
        assert_eq!(registry.probe("unknown"), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn register_replaces_entries_with_the_same_name() {
        let mut registry = ProbeRegistry::new();
        registry.register(CapabilityDescriptor {
            name: "surface",
            probe: || false,
        });
        registry.register(CapabilityDescriptor {
            name: "surface",
            probe: || true,
        });

        assert_eq!(registry.probe("surface"), Some(true));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn names_preserve_registration_order() {
        let mut registry = ProbeRegistry::new();
        registry.register(CapabilityDescriptor {
            name: "b",
            probe: || true,
        });
        registry.register(CapabilityDescriptor {
            name: "a",
            probe: || true,
        });
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn global_probe_is_false_off_wasm() {
        assert!(!probe_global_property("navigator.onLine"));
        assert!(!probe_global_property("localStorage"));
    }
}
