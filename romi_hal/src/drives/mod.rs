//! Drive adapter implementations.
//!
//! This module contains all drive adapter implementations:
//!
//! - [`simulation`] - Software simulation adapter for development and testing
//!
//! # Adding New Adapters
//!
//! 1. Create a new submodule under `drives/`
//! 2. Implement the `DriveAdapter` trait from `romi_common::drive`
//! 3. Register the adapter in `register_all_drives()`
//! 4. Add export and documentation

pub mod simulation;

use crate::registry::DriveRegistry;

/// Register all built-in adapters into the given registry.
///
/// Called once at startup before any adapter is requested.
pub fn register_all_drives(registry: &mut DriveRegistry) {
    // Register simulation adapter
    registry.register("simulation", simulation::create_drive);

    // Future adapters will be registered here:
    // registry.register("drv8302", drv8302::create_drive);
}
