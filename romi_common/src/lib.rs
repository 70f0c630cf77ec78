//! Romi Common Library
//!
//! This crate provides the shared types for the Romi actuator
//! workspace: the lifecycle state enum, the wire-angle codec, the
//! configuration schema, and the drive/sensor collaborator interfaces.
//!
//! # Module Structure
//!
//! - [`angle`] - Fixed-point wire angle codec
//! - [`config`] - Controller configuration and TOML loading
//! - [`consts`] - Identity strings, wire error codes, buffer limits
//! - [`drive`] - `DriveAdapter` trait, fault word, factory type
//! - [`sensor`] - Quadrature counter and angle sampling
//! - [`state`] - `LifecycleState` enum
//! - [`prelude`] - Common re-exports for convenience

pub mod angle;
pub mod config;
pub mod consts;
pub mod drive;
pub mod prelude;
pub mod sensor;
pub mod state;
