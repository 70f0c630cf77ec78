//! Simulation drive adapter.
//!
//! `SimulatedDrive` implements the `DriveAdapter` trait with a
//! software-modeled shaft: a proportional position loop saturated at
//! the configured velocity limit. Each step mirrors the modeled angle
//! into the shared quadrature counter, so the controller observes
//! motion through the same feedback path a real encoder would feed.

use romi_common::config::{MotorConfig, PowerStageConfig};
use romi_common::drive::{DriveAdapter, DriveError};
use romi_common::sensor::FeedbackHandle;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Simulation adapter implementing the DriveAdapter trait.
pub struct SimulatedDrive {
    /// Adapter name
    name: &'static str,
    /// Adapter version
    version: &'static str,
    /// Modeled shaft angle [rad]
    position: f64,
    /// Modeled shaft velocity [rad/s]
    velocity: f64,
    /// Position target [rad]
    target: f64,
    /// Power stage enabled?
    enabled: bool,
    /// Tuning applied and FOC model ready?
    initialized: bool,
    /// Origin alignment completed?
    calibrated: bool,
    /// Power-stage pins claimed?
    stage_linked: bool,
    /// Encoder counter shared with the control unit
    feedback: Option<FeedbackHandle>,
    /// Motor constants and loop gains from the configure step
    tuning: MotorConfig,
}

impl SimulatedDrive {
    /// Create a new simulation adapter instance.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            enabled: false,
            initialized: false,
            calibrated: false,
            stage_linked: false,
            feedback: None,
            tuning: MotorConfig::default(),
        }
    }

    /// Modeled shaft angle [rad].
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Modeled shaft velocity [rad/s].
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Whether origin alignment has completed.
    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }
}

impl Default for SimulatedDrive {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveAdapter for SimulatedDrive {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn link_sensor(&mut self, feedback: FeedbackHandle) {
        debug!(
            counts_per_rev = feedback.counts_per_rev(),
            "simulation: sensor linked"
        );
        self.feedback = Some(feedback);
    }

    fn link_driver(&mut self, pins: &PowerStageConfig) -> Result<(), DriveError> {
        debug!(
            phase_a = pins.phase_a,
            phase_b = pins.phase_b,
            phase_c = pins.phase_c,
            enable = pins.enable,
            "simulation: power stage linked"
        );
        self.stage_linked = true;
        Ok(())
    }

    fn init(&mut self, tuning: &MotorConfig) -> Result<(), DriveError> {
        if self.feedback.is_none() {
            return Err(DriveError::NotLinked("sensor not linked".to_string()));
        }
        if !self.stage_linked {
            return Err(DriveError::NotLinked("power stage not linked".to_string()));
        }
        self.tuning = tuning.clone();
        self.initialized = true;
        self.enabled = false;
        info!(
            pole_pairs = tuning.pole_pairs,
            velocity_limit = tuning.velocity_limit,
            angle_p = tuning.angle_p,
            "simulation: drive initialized"
        );
        Ok(())
    }

    fn calibrate_origin(&mut self) -> bool {
        if !self.initialized {
            debug!("simulation: calibrate refused, drive not initialized");
            return false;
        }
        // Alignment leaves the shaft where it is; only the electrical
        // zero is established.
        self.calibrated = true;
        info!(position = self.position, "simulation: origin aligned");
        true
    }

    fn enable(&mut self) {
        self.enabled = true;
        debug!("simulation: power stage enabled");
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.velocity = 0.0;
        debug!("simulation: power stage disabled");
    }

    fn set_target(&mut self, angle: f64) {
        self.target = angle;
    }

    fn step(&mut self, dt: Duration) {
        if !self.enabled {
            return;
        }
        let dt_s = dt.as_secs_f64();
        if dt_s <= 0.0 {
            return;
        }

        // Proportional position loop saturated at the velocity limit.
        let position_error = self.target - self.position;
        self.velocity = (self.tuning.angle_p * position_error)
            .clamp(-self.tuning.velocity_limit, self.tuning.velocity_limit);
        self.position += self.velocity * dt_s;

        if let Some(feedback) = &self.feedback {
            feedback.store_radians(self.position);
        }

        trace!(
            pos = self.position,
            vel = self.velocity,
            target = self.target,
            "simulation: step"
        );
    }
}

/// Factory for the drive registry.
pub fn create_drive() -> Box<dyn DriveAdapter> {
    Box::new(SimulatedDrive::new())
}
