//! Prelude module for common re-exports.
//!
//! Consumers can do `use romi_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ControllerConfig, MotorConfig, PowerStageConfig, SensorConfig};

// ─── System constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_US, FIRMWARE_NAME, FIRMWARE_VERSION};

// ─── Lifecycle ──────────────────────────────────────────────────────
pub use crate::state::LifecycleState;

// ─── Wire angle codec ───────────────────────────────────────────────
pub use crate::angle::{AngleError, WireAngle, milliradians};

// ─── Drive & feedback ───────────────────────────────────────────────
pub use crate::drive::{DriveAdapter, DriveError, DriveFactory, DriveFault};
pub use crate::sensor::{AngleSample, FeedbackHandle, QuadratureCounter, QuadratureSensor};
