//! # Romi Control Unit Library
//!
//! Position control brain for a single brushless actuator. Provides a
//! paced control cycle that drains console command frames, validates
//! them against the actuator lifecycle, and runs one drive step per
//! tick through a pluggable drive adapter.
//!
//! ## Module Structure
//!
//! - `lifecycle`: the seven-state actuator lifecycle machine
//! - `controller`: the actuator record and its operations
//! - `command`: wire protocol, opcode registry and dispatch
//! - `console`: line-oriented stdin/stdout transport
//! - `cycle`: RT setup and the paced cycle runner
//!
//! ## Single-Threaded Control
//!
//! Commands and motor updates run on one cycle thread; the console
//! reader thread only moves complete lines over a channel. The sole
//! state shared with interrupt-style code is the quadrature counter,
//! a single atomic integer.

#![deny(clippy::disallowed_types)]

pub mod command;
pub mod console;
pub mod controller;
pub mod cycle;
pub mod lifecycle;
