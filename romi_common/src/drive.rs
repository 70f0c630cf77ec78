//! Drive adapter trait and error types.
//!
//! This module defines:
//! - `DriveAdapter` trait - Interface for pluggable drive backends
//! - `DriveError` enum - Error types for drive operations
//! - `DriveFault` bitflags - Fault word polled every control step
//! - `DriveFactory` type alias - Factory function type

use crate::config::{MotorConfig, PowerStageConfig};
use crate::sensor::FeedbackHandle;
use bitflags::bitflags;
use std::time::Duration;
use thiserror::Error;

/// Error types for drive operations.
#[derive(Debug, Clone, Error)]
pub enum DriveError {
    /// Drive initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Operation requires a sensor or power-stage link not yet made
    #[error("Not linked: {0}")]
    NotLinked(String),

    /// Adapter not found in the registry
    #[error("Drive adapter not found: {0}")]
    AdapterNotFound(String),
}

/// Factory function type for creating drive adapter instances.
pub type DriveFactory = fn() -> Box<dyn DriveAdapter>;

bitflags! {
    /// Drive fault word polled by the control loop after each step.
    ///
    /// CRITICAL flags disable the drive and latch the lifecycle error
    /// state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DriveFault: u8 {
        /// Phase current above the configured limit. **CRITICAL**.
        const OVER_CURRENT     = 0x01;
        /// Gate driver over-temperature warning. **CRITICAL**.
        const OVER_TEMPERATURE = 0x02;
        /// DC link below operating voltage.
        const UNDER_VOLTAGE    = 0x04;
        /// Position feedback implausible or lost. **CRITICAL**.
        const SENSOR_FAULT     = 0x08;
    }
}

impl DriveFault {
    /// Mask of all CRITICAL flags.
    pub const CRITICAL_MASK: Self = Self::from_bits_truncate(
        Self::OVER_CURRENT.bits() | Self::OVER_TEMPERATURE.bits() | Self::SENSOR_FAULT.bits(),
    );

    /// Returns true if any CRITICAL flag is set.
    #[inline]
    pub const fn has_critical(&self) -> bool {
        self.intersects(Self::CRITICAL_MASK)
    }
}

impl Default for DriveFault {
    fn default() -> Self {
        Self::empty()
    }
}

/// Trait defining the interface for drive backends.
///
/// The control unit owns exactly one boxed adapter, selected by name
/// from the drive registry at construction. The same controller code
/// runs against real hardware and the simulation backend.
///
/// # Lifecycle
///
/// 1. `link_sensor()` / `link_driver()` - during the setup step
/// 2. `init()` - during the configure step, leaves the drive disabled
/// 3. `calibrate_origin()` - during the calibrate step
/// 4. `enable()` / `disable()` - power-stage gating
/// 5. `step()` - one control iteration per cycle while enabled
pub trait DriveAdapter: Send + Sync {
    /// Returns the adapter's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the adapter's semantic version.
    fn version(&self) -> &'static str;

    /// Attach the position feedback the control loops close against.
    fn link_sensor(&mut self, feedback: FeedbackHandle);

    /// Claim the power-stage pins.
    ///
    /// # Errors
    /// Returns `DriveError::InitFailed` if the power stage cannot be
    /// brought up with the given pin map.
    fn link_driver(&mut self, pins: &PowerStageConfig) -> Result<(), DriveError>;

    /// Apply motor constants and loop gains, then initialize the drive.
    /// The drive stays disabled until `enable()`.
    ///
    /// # Errors
    /// Returns `DriveError::NotLinked` when called before both links are
    /// made, `DriveError::InitFailed` on hardware rejection.
    fn init(&mut self, tuning: &MotorConfig) -> Result<(), DriveError>;

    /// Run the origin-alignment procedure. Returns true on success.
    /// Requires a completed `init()`.
    fn calibrate_origin(&mut self) -> bool;

    /// Enable the power stage.
    fn enable(&mut self);

    /// Disable the power stage. Safe to call in any state.
    fn disable(&mut self);

    /// Set the position target [rad]. Accepted at any time; only acted
    /// on by `step()` while enabled.
    fn set_target(&mut self, angle: f64);

    /// One control iteration. `dt` is the elapsed time since the
    /// previous step. Must not block.
    fn step(&mut self, dt: Duration);

    /// Current fault word. Default: no faults.
    fn faults(&self) -> DriveFault {
        DriveFault::empty()
    }
}

impl core::fmt::Debug for dyn DriveAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DriveAdapter")
            .field("name", &self.name())
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestDrive {
        enabled: bool,
        target: f64,
    }

    impl DriveAdapter for TestDrive {
        fn name(&self) -> &'static str {
            "test"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn link_sensor(&mut self, _feedback: FeedbackHandle) {}

        fn link_driver(&mut self, _pins: &PowerStageConfig) -> Result<(), DriveError> {
            Ok(())
        }

        fn init(&mut self, _tuning: &MotorConfig) -> Result<(), DriveError> {
            Ok(())
        }

        fn calibrate_origin(&mut self) -> bool {
            true
        }

        fn enable(&mut self) {
            self.enabled = true;
        }

        fn disable(&mut self) {
            self.enabled = false;
        }

        fn set_target(&mut self, angle: f64) {
            self.target = angle;
        }

        fn step(&mut self, _dt: Duration) {}
    }

    #[test]
    fn test_drive_error_display() {
        let err = DriveError::InitFailed("driver timeout".to_string());
        assert!(err.to_string().contains("driver timeout"));

        let err = DriveError::AdapterNotFound("simulation".to_string());
        assert!(err.to_string().contains("simulation"));
    }

    #[test]
    fn drive_fault_critical() {
        let non_critical = DriveFault::UNDER_VOLTAGE;
        assert!(!non_critical.has_critical());

        let critical = DriveFault::OVER_CURRENT;
        assert!(critical.has_critical());

        let mixed = DriveFault::UNDER_VOLTAGE | DriveFault::SENSOR_FAULT;
        assert!(mixed.has_critical());
    }

    #[test]
    fn drive_fault_bits_roundtrip() {
        for flag in [
            DriveFault::OVER_CURRENT,
            DriveFault::OVER_TEMPERATURE,
            DriveFault::UNDER_VOLTAGE,
            DriveFault::SENSOR_FAULT,
        ] {
            let bits = flag.bits();
            let back = DriveFault::from_bits(bits).unwrap();
            assert_eq!(back, flag, "round-trip failed for DriveFault 0x{bits:02x}");
        }
        let combo = DriveFault::OVER_CURRENT | DriveFault::UNDER_VOLTAGE;
        assert_eq!(DriveFault::from_bits(combo.bits()).unwrap(), combo);
    }

    #[test]
    fn default_faults_are_empty() {
        let drive = TestDrive {
            enabled: false,
            target: 0.0,
        };
        assert!(drive.faults().is_empty());
        assert!(!drive.faults().has_critical());
        assert!(!drive.enabled);
        assert_eq!(drive.target, 0.0);
    }
}
