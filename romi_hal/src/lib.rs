//! # Romi HAL Library
//!
//! Drive adapters behind a pluggable factory registry.
//!
//! Adapters implement the `DriveAdapter` trait defined in
//! `romi_common::drive`. The control unit resolves one adapter by name
//! at construction and talks to it through the trait for the rest of
//! the process lifetime, so the same controller code runs against real
//! hardware and the simulation backend.
//!
//! # Module Structure
//!
//! - [`registry`] - Drive factory registration
//! - [`drives`] - Drive adapter implementations

#![deny(warnings)]
#![deny(missing_docs)]

pub mod drives;
pub mod registry;

// Re-export key types for convenience
pub use crate::registry::DriveRegistry;
