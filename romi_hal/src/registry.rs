//! Drive adapter selection.
//!
//! The controller resolves exactly one adapter by name at startup (the
//! `drive` key of the configuration) and owns it for the process
//! lifetime. `DriveRegistry` maps adapter names to factories;
//! [`DriveRegistry::with_builtin`] carries every in-tree adapter, the
//! same way the command table carries every opcode on the protocol
//! side.

use romi_common::drive::{DriveAdapter, DriveError, DriveFactory};
use std::collections::HashMap;

/// Name → factory map consulted once when the controller is built.
pub struct DriveRegistry {
    factories: HashMap<&'static str, DriveFactory>,
}

impl DriveRegistry {
    /// Empty registry. Production code wants [`Self::with_builtin`];
    /// this exists for tests wiring custom adapters.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with every in-tree adapter registered.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drives::register_all_drives(&mut registry);
        registry
    }

    /// Register an adapter factory under its name.
    ///
    /// # Panics
    ///
    /// Panics when the name is taken. Adapter names are compile-time
    /// constants, so a duplicate is a wiring error, not a runtime
    /// condition.
    pub fn register(&mut self, name: &'static str, factory: DriveFactory) {
        if self.factories.insert(name, factory).is_some() {
            panic!("Drive adapter '{name}' is already registered");
        }
    }

    /// Instantiate the named adapter. Each call produces a fresh
    /// instance with no shared state.
    ///
    /// # Errors
    ///
    /// `DriveError::AdapterNotFound` for an unregistered name; the
    /// message lists the known adapters so a configuration typo is
    /// diagnosable from the log line alone.
    pub fn create_drive(&self, name: &str) -> Result<Box<dyn DriveAdapter>, DriveError> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(DriveError::AdapterNotFound(format!(
                "'{name}' (known: {})",
                self.known_names().join(", ")
            ))),
        }
    }

    /// Registered adapter names, sorted.
    pub fn known_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriveRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
