//! Lifecycle state enum for the actuator control unit.
//!
//! `#[repr(u8)]` for compact memory layout and stable wire reporting.
//! The state is mutated only by the lifecycle transition functions in
//! `romi_control_unit`; everything else reads it.

use serde::{Deserialize, Serialize};

/// Operational lifecycle state of the actuator.
///
/// Exactly one instance exists per physical actuator. The ordered
/// bring-up is setup → configure → calibrate → enable; disable is
/// accepted from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LifecycleState {
    /// Fresh record, nothing touched yet.
    Created = 0,
    /// Sensor interrupts bound, power-stage pins claimed.
    SetUp = 1,
    /// Tuning constants applied, drive initialized but disabled.
    Configured = 2,
    /// Origin alignment completed.
    Calibrated = 3,
    /// Power stage live, `update()` performs control steps.
    Enabled = 4,
    /// Power stage off after having been enabled.
    Disabled = 5,
    /// Latched fault — commanded transitions rejected.
    Error = 6,
}

impl LifecycleState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Created),
            1 => Some(Self::SetUp),
            2 => Some(Self::Configured),
            3 => Some(Self::Calibrated),
            4 => Some(Self::Enabled),
            5 => Some(Self::Disabled),
            6 => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns true if the power stage is live and `update()` does work.
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Created
    }
}
